use std::{fs, path::Path};

use serde::Deserialize;

use crate::structures::RoutingSettings;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub build: BuildConfig,
    pub routing: RoutingSettings,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize)]
pub struct BuildConfig {
    pub inputs: Vec<Ingestor>,
    pub output: String,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum SourceLocation {
    Local(String),
    Remote(String),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "ingestor")]
pub enum Ingestor {
    #[serde(rename = "catalogue/yaml")]
    CatalogueYaml(CatalogueYamlIngestor),
    #[serde(rename = "gtfs/generic")]
    GtfsGeneric(GtfsGenericIngestor),
}

#[derive(Debug, Deserialize)]
pub struct CatalogueYamlIngestor {
    pub url: String,
    pub phase: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct GtfsGenericIngestor {
    pub name: String,
    pub url: String,
    pub phase: Option<u8>,
}

impl Ingestor {
    pub fn label(&self) -> &str {
        match self {
            Ingestor::CatalogueYaml(_) => "catalogue/yaml",
            Ingestor::GtfsGeneric(c) => &c.name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Ingestor::CatalogueYaml(c) => &c.url,
            Ingestor::GtfsGeneric(c) => &c.url,
        }
    }

    pub fn location(&self) -> Result<SourceLocation, String> {
        let url = self.url();
        if let Some(path) = url.strip_prefix("path:") {
            Ok(SourceLocation::Local(path.to_string()))
        } else if url.starts_with("http://") || url.starts_with("https://") {
            Ok(SourceLocation::Remote(url.to_string()))
        } else {
            Err(format!("Unknown URL scheme for '{}': {url}", self.label()))
        }
    }

    /// Local file to ingest. Remote sources are not fetched.
    pub fn resolve_path(&self) -> Result<String, String> {
        match self.location()? {
            SourceLocation::Local(path) if Path::new(&path).is_file() => Ok(path),
            SourceLocation::Local(path) => {
                Err(format!("Input '{}' not found at {path}", self.label()))
            }
            SourceLocation::Remote(url) => {
                Err(format!("Remote download not yet implemented: {url}"))
            }
        }
    }

    pub fn phase(&self) -> u8 {
        match self {
            Ingestor::CatalogueYaml(i) => i.phase.unwrap_or(0),
            Ingestor::GtfsGeneric(i) => i.phase.unwrap_or(1),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config: {e}"))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        serde_yml::from_str(content).map_err(|e| format!("Failed to parse config: {e}"))
    }
}
