use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, SidekickError};

pub const DEFAULT_FORMAT: &str = "yaml";
pub const DEFAULT_FILE_MODE: u32 = 0o664;

/// Output encodings a resource can be rendered to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
    Ini,
    Csv,
    Env,
    Cert,
    Txt,
    Flatten,
    Bundle,
    Credential,
    Template,
    Aws,
}

impl OutputFormat {
    pub fn parse(tag: &str) -> Result<Self> {
        let format = match tag {
            "yaml" | "yml" => OutputFormat::Yaml,
            "json" => OutputFormat::Json,
            "ini" => OutputFormat::Ini,
            "csv" => OutputFormat::Csv,
            "env" => OutputFormat::Env,
            "cert" => OutputFormat::Cert,
            "txt" => OutputFormat::Txt,
            "flatten" => OutputFormat::Flatten,
            "bundle" => OutputFormat::Bundle,
            "credential" => OutputFormat::Credential,
            "template" => OutputFormat::Template,
            "aws" => OutputFormat::Aws,
            other => return Err(SidekickError::UnsupportedFormat(other.to_string())),
        };
        Ok(format)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
            OutputFormat::Ini => "ini",
            OutputFormat::Csv => "csv",
            OutputFormat::Env => "env",
            OutputFormat::Cert => "cert",
            OutputFormat::Txt => "txt",
            OutputFormat::Flatten => "flatten",
            OutputFormat::Bundle => "bundle",
            OutputFormat::Credential => "credential",
            OutputFormat::Template => "template",
            OutputFormat::Aws => "aws",
        }
    }
}

/// Secret engine a resource is fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Key/value mount. A response whose data holds exactly `data` (an
    /// object) and `metadata` is taken as a KV version 2 envelope and
    /// unwrapped, so a version 1 secret with just those two keys is
    /// unwrapped too. Use `raw` to read such a secret untouched.
    Secret,
    Pki,
    Aws,
    Database,
    Cubbyhole,
    Raw,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Secret => "secret",
            ResourceKind::Pki => "pki",
            ResourceKind::Aws => "aws",
            ResourceKind::Database => "database",
            ResourceKind::Cubbyhole => "cubbyhole",
            ResourceKind::Raw => "raw",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "secret" => Ok(ResourceKind::Secret),
            "pki" => Ok(ResourceKind::Pki),
            "aws" => Ok(ResourceKind::Aws),
            "database" => Ok(ResourceKind::Database),
            "cubbyhole" => Ok(ResourceKind::Cubbyhole),
            "raw" => Ok(ResourceKind::Raw),
            other => Err(format!("unknown resource type: {}", other)),
        }
    }
}

/// One secret-to-file mapping
#[derive(Debug, Clone, PartialEq)]
pub struct SecretResource {
    pub kind: ResourceKind,
    /// Path relative to the kind's mount (verbatim for `raw`)
    pub path: String,
    /// Output format tag, checked when rendering
    pub format: String,
    /// Destination, joined to the output directory when relative
    pub filename: String,
    pub file_mode: u32,
    /// Command run after a successful write
    pub exec: Option<String>,
    /// Template source for the `template` format
    pub template_file: Option<PathBuf>,
    /// Extra parameters sent when the resource is issued by a write
    pub params: BTreeMap<String, String>,
}

impl SecretResource {
    pub fn new(kind: ResourceKind, path: impl Into<String>) -> Self {
        let path = path.into();
        let filename = default_filename(&path, DEFAULT_FORMAT);
        Self {
            kind,
            path,
            format: DEFAULT_FORMAT.to_string(),
            filename,
            file_mode: DEFAULT_FILE_MODE,
            exec: None,
            template_file: None,
            params: BTreeMap::new(),
        }
    }

    /// Location of the secret in the store
    pub fn store_path(&self) -> String {
        let path = self.path.trim_matches('/');
        match self.kind {
            ResourceKind::Secret => format!("secret/{}", path),
            ResourceKind::Pki => format!("pki/issue/{}", path),
            ResourceKind::Aws => format!("aws/creds/{}", path),
            ResourceKind::Database => format!("database/creds/{}", path),
            ResourceKind::Cubbyhole => format!("cubbyhole/{}", path),
            ResourceKind::Raw => path.to_string(),
        }
    }

    /// Issued resources are produced by writing the parameters to the store
    pub fn is_issued(&self) -> bool {
        self.kind == ResourceKind::Pki
    }

    pub fn params_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.params
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}

fn default_filename(path: &str, format: &str) -> String {
    let name = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path);
    format!("{}.{}", name, format)
}

impl fmt::Display for SecretResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.path)
    }
}

/// Parses `kind:path[:key=value,...]`.
///
/// Recognised keys are `fmt`, `file`, `mode` (octal), `exec` and `tpl`;
/// anything else becomes a write parameter.
impl FromStr for SecretResource {
    type Err = SidekickError;

    fn from_str(spec: &str) -> Result<Self> {
        let invalid = |reason: &str| SidekickError::InvalidResource {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = spec.splitn(3, ':');
        let kind: ResourceKind = parts
            .next()
            .unwrap_or_default()
            .parse()
            .map_err(|e: String| invalid(&e))?;
        let path = parts
            .next()
            .filter(|p| !p.trim_matches('/').is_empty())
            .ok_or_else(|| invalid("missing secret path"))?;

        let mut resource = SecretResource::new(kind, path);
        let mut filename = None;

        for option in parts.next().unwrap_or_default().split(',') {
            if option.is_empty() {
                continue;
            }
            let (key, value) = option
                .split_once('=')
                .ok_or_else(|| invalid(&format!("option '{}' is not key=value", option)))?;
            match key {
                "fmt" => {
                    OutputFormat::parse(value)?;
                    resource.format = value.to_string();
                }
                "file" => filename = Some(value.to_string()),
                "mode" => {
                    resource.file_mode = u32::from_str_radix(value.trim_start_matches("0o"), 8)
                        .map_err(|_| invalid(&format!("invalid file mode '{}'", value)))?;
                }
                "exec" => {
                    resource.exec = Some(value.to_string()).filter(|v| !v.trim().is_empty());
                }
                "tpl" => resource.template_file = Some(PathBuf::from(value)),
                _ => {
                    resource.params.insert(key.to_string(), value.to_string());
                }
            }
        }

        resource.filename =
            filename.unwrap_or_else(|| default_filename(&resource.path, &resource.format));
        Ok(resource)
    }
}
