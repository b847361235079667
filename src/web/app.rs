use std::sync::Arc;

use async_graphql::{
    Context, EmptyMutation, EmptySubscription, Object, Result, Schema, http::GraphiQLSource,
};
use async_graphql_poem::GraphQL;
use poem::{Route, Server, get, handler, listener::TcpListener, web::Html};
use tracing::info;

use crate::{
    routing::TransportRouter,
    structures::{BusStat, StopInfo, plan::Plan},
};

struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn ping(&self) -> &str {
        "pong"
    }

    /// Fastest itinerary between two stops, null when they are not connected.
    async fn plan(&self, ctx: &Context<'_>, from: String, to: String) -> Result<Option<Plan>> {
        let router = ctx.data::<Arc<TransportRouter>>()?;

        Ok(router.find_route(&from, &to)?)
    }

    async fn nearest_stop(&self, ctx: &Context<'_>, lat: f64, lng: f64) -> Result<Option<String>> {
        let router = ctx.data::<Arc<TransportRouter>>()?;

        Ok(router.nearest_stop(lat, lng).map(str::to_string))
    }

    /// Statistics of a bus line, null when no bus has that name.
    async fn bus(&self, ctx: &Context<'_>, name: String) -> Result<Option<BusStat>> {
        let router = ctx.data::<Arc<TransportRouter>>()?;

        Ok(router.catalogue().bus_stat(&name))
    }

    async fn stop(&self, ctx: &Context<'_>, name: String) -> Result<Option<StopInfo>> {
        let router = ctx.data::<Arc<TransportRouter>>()?;

        Ok(router.catalogue().stop_info(&name))
    }
}

#[handler]
async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

pub fn app(router: Arc<TransportRouter>) -> Route {
    let schema = Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(router)
        .finish();

    Route::new()
        .at("/graphql", GraphQL::new(schema))
        .at("/graphiql", get(graphiql))
}

pub async fn server(router: Arc<TransportRouter>, address: &str) -> std::io::Result<()> {
    info!("Serving on {}", address);
    Server::new(TcpListener::bind(address.to_string()))
        .run(app(router))
        .await
}
