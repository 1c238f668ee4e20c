// src/render/encode.rs

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;

use crate::error::{Result, SidekickError};
use crate::payload::{SecretPayload, SecretValue};
use crate::resource::{OutputFormat, SecretResource};

const CERTIFICATE: &str = "certificate";
const PRIVATE_KEY: &str = "private_key";
const ISSUING_CA: &str = "issuing_ca";

/// A file produced by an encoder, not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: Vec<u8>,
}

impl Artifact {
    fn new(path: PathBuf, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path,
            content: content.into(),
        }
    }
}

/// Serialize `payload` into every file `format` produces for `target`.
///
/// Nothing is written here, so a malformed secret never leaves partial output.
pub fn encode(
    format: OutputFormat,
    target: &Path,
    resource: &SecretResource,
    payload: &SecretPayload,
) -> Result<Vec<Artifact>> {
    let single = |content: Vec<u8>| -> Result<Vec<Artifact>> {
        Ok(vec![Artifact::new(target.to_path_buf(), content)])
    };

    match format {
        OutputFormat::Yaml => single(serde_yaml::to_string(payload)?.into_bytes()),
        OutputFormat::Json => {
            let mut content = serde_json::to_vec_pretty(payload)?;
            content.push(b'\n');
            single(content)
        }
        OutputFormat::Ini => single(lines(payload, |k, v| {
            format!("{} = {}", k, ini_value(&v.to_string()))
        })),
        OutputFormat::Env => single(lines(payload, |k, v| {
            format!("{}={}", k.to_uppercase(), env_value(&v.to_string()))
        })),
        OutputFormat::Csv => single(lines(payload, |k, v| {
            format!("{},{}", csv_field(k), csv_field(&v.to_string()))
        })),
        OutputFormat::Txt => encode_txt(target, payload),
        OutputFormat::Flatten => encode_flatten(target, payload),
        OutputFormat::Cert => encode_cert(target, payload),
        OutputFormat::Bundle => encode_bundle(target, payload),
        OutputFormat::Credential => {
            let data = required(payload, format, "private_key_data")?;
            let decoded = base64::decode(data.trim()).map_err(|e| SidekickError::MalformedSecret {
                format: format.as_str(),
                reason: format!("private_key_data is not valid base64: {}", e),
            })?;
            single(decoded)
        }
        OutputFormat::Aws => encode_aws(payload).and_then(single),
        OutputFormat::Template => encode_template(resource, payload).and_then(single),
    }
}

fn lines(payload: &SecretPayload, line: impl Fn(&str, &SecretValue) -> String) -> Vec<u8> {
    let mut out = String::new();
    for (key, value) in payload {
        out.push_str(&line(key, value));
        out.push('\n');
    }
    out.into_bytes()
}

const ENV_SPECIAL: &[char] = &[
    '\n', '\r', '"', '\'', '\\', '$', '`', ' ', '\t', '#', '=',
];
const INI_SPECIAL: &[char] = &['\n', '\r', '"', '\\', ';', '#'];

/// Shell-compatible value: double-quoted with `\`, `"`, `$` and line breaks
/// escaped whenever it holds anything beyond plain word characters
fn env_value(value: &str) -> String {
    if value.contains(ENV_SPECIAL) {
        escaped(value, true)
    } else {
        value.to_string()
    }
}

/// Ini value, quoted when it spans lines, carries comment markers or
/// leading/trailing whitespace
fn ini_value(value: &str) -> String {
    if value.contains(INI_SPECIAL) || value.trim() != value {
        escaped(value, false)
    } else {
        value.to_string()
    }
}

fn escaped(value: &str, escape_dollar: bool) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '$' if escape_dollar => out.push_str("\\$"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// `target` with `suffix` appended to its file name
fn suffixed(target: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn required<'a>(payload: &'a SecretPayload, format: OutputFormat, key: &str) -> Result<&'a str> {
    match payload.get(key) {
        Some(SecretValue::Text(text)) => Ok(text),
        Some(_) => Err(SidekickError::MalformedSecret {
            format: format.as_str(),
            reason: format!("field '{}' is not plain text", key),
        }),
        None => Err(SidekickError::MalformedSecret {
            format: format.as_str(),
            reason: format!("missing field '{}'", key),
        }),
    }
}

fn encode_txt(target: &Path, payload: &SecretPayload) -> Result<Vec<Artifact>> {
    if payload.len() == 1 {
        let value = payload.values().next().map(ToString::to_string).unwrap_or_default();
        return Ok(vec![Artifact::new(target.to_path_buf(), value)]);
    }

    Ok(payload
        .iter()
        .map(|(key, value)| Artifact::new(suffixed(target, &format!(".{}", key)), value.to_string()))
        .collect())
}

fn encode_flatten(target: &Path, payload: &SecretPayload) -> Result<Vec<Artifact>> {
    payload
        .iter()
        .map(|(key, value)| {
            if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
                return Err(SidekickError::MalformedSecret {
                    format: OutputFormat::Flatten.as_str(),
                    reason: format!("key '{}' cannot be used as a file name", key),
                });
            }
            Ok(Artifact::new(target.join(key), value.to_string()))
        })
        .collect()
}

fn encode_cert(target: &Path, payload: &SecretPayload) -> Result<Vec<Artifact>> {
    let format = OutputFormat::Cert;
    Ok(vec![
        Artifact::new(suffixed(target, ".crt"), required(payload, format, CERTIFICATE)?),
        Artifact::new(suffixed(target, ".key"), required(payload, format, PRIVATE_KEY)?),
        Artifact::new(suffixed(target, ".ca"), required(payload, format, ISSUING_CA)?),
    ])
}

fn encode_bundle(target: &Path, payload: &SecretPayload) -> Result<Vec<Artifact>> {
    let format = OutputFormat::Bundle;
    let certificate = required(payload, format, CERTIFICATE)?;
    let private_key = required(payload, format, PRIVATE_KEY)?;
    let issuing_ca = required(payload, format, ISSUING_CA)?;

    Ok(vec![
        Artifact::new(suffixed(target, ".pem"), certificate),
        Artifact::new(suffixed(target, "-key.pem"), format!("{}\n", private_key)),
        Artifact::new(suffixed(target, "-ca.pem"), issuing_ca),
        Artifact::new(
            suffixed(target, "-bundle.pem"),
            format!("{}\n\n{}", certificate, issuing_ca),
        ),
    ])
}

fn encode_aws(payload: &SecretPayload) -> Result<Vec<u8>> {
    let format = OutputFormat::Aws;
    let access_key = required(payload, format, "access_key")?;
    let secret_key = required(payload, format, "secret_key")?;

    let mut out = format!(
        "[default]\naws_access_key_id = {}\naws_secret_access_key = {}\n",
        access_key, secret_key
    );
    if let Some(token) = payload
        .get("security_token")
        .and_then(SecretValue::as_text)
        .filter(|t| !t.is_empty())
    {
        out.push_str(&format!("aws_session_token = {}\n", token));
    }
    Ok(out.into_bytes())
}

fn encode_template(resource: &SecretResource, payload: &SecretPayload) -> Result<Vec<u8>> {
    let template_file = resource.template_file.as_deref().ok_or_else(|| {
        SidekickError::MissingConfiguration(format!("no template file set for resource {}", resource))
    })?;

    let source =
        std::fs::read_to_string(template_file).map_err(|e| SidekickError::io(template_file, e))?;

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .render_template(&source, payload)
        .map(String::into_bytes)
        .map_err(|e| SidekickError::Template {
            path: template_file.to_path_buf(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceKind;

    fn payload(fields: &[(&str, &str)]) -> SecretPayload {
        fields.iter().map(|(k, v)| (k.to_string(), (*v).into())).collect()
    }

    fn encode_as(format: OutputFormat, payload: &SecretPayload) -> Result<Vec<Artifact>> {
        let resource = SecretResource::new(ResourceKind::Secret, "app");
        encode(format, Path::new("/out/app"), &resource, payload)
    }

    fn text(artifact: &Artifact) -> &str {
        std::str::from_utf8(&artifact.content).unwrap()
    }

    #[test]
    fn test_line_formats() {
        let data = payload(&[("user", "admin"), ("db_pass", "a,\"b\"")]);

        let ini = encode_as(OutputFormat::Ini, &data).unwrap();
        assert_eq!(text(&ini[0]), "db_pass = \"a,\\\"b\\\"\"\nuser = admin\n");

        let env = encode_as(OutputFormat::Env, &data).unwrap();
        assert_eq!(text(&env[0]), "DB_PASS=\"a,\\\"b\\\"\"\nUSER=admin\n");

        let csv = encode_as(OutputFormat::Csv, &data).unwrap();
        assert_eq!(text(&csv[0]), "db_pass,\"a,\"\"b\"\"\"\nuser,admin\n");
    }

    #[test]
    fn test_multiline_values_stay_on_one_line() {
        let data = payload(&[("cert", "-----BEGIN-----\nMIIB\"x\n-----END-----")]);

        let env = encode_as(OutputFormat::Env, &data).unwrap();
        assert_eq!(
            text(&env[0]),
            "CERT=\"-----BEGIN-----\\nMIIB\\\"x\\n-----END-----\"\n"
        );

        let ini = encode_as(OutputFormat::Ini, &data).unwrap();
        assert_eq!(
            text(&ini[0]),
            "cert = \"-----BEGIN-----\\nMIIB\\\"x\\n-----END-----\"\n"
        );
    }

    #[test]
    fn test_env_escapes_shell_expansion() {
        let data = payload(&[("dsn", "pg://u:p$w@db #1"), ("plain", "abc123")]);

        let env = encode_as(OutputFormat::Env, &data).unwrap();
        assert_eq!(text(&env[0]), "DSN=\"pg://u:p\\$w@db #1\"\nPLAIN=abc123\n");

        let ini = encode_as(OutputFormat::Ini, &data).unwrap();
        assert_eq!(text(&ini[0]), "dsn = \"pg://u:p$w@db #1\"\nplain = abc123\n");
    }

    #[test]
    fn test_structured_formats() {
        let data = payload(&[("password", "secret123")]);

        let json = encode_as(OutputFormat::Json, &data).unwrap();
        let decoded: serde_json::Value = serde_json::from_slice(&json[0].content).unwrap();
        assert_eq!(decoded, serde_json::json!({"password": "secret123"}));

        let yaml = encode_as(OutputFormat::Yaml, &data).unwrap();
        assert_eq!(text(&yaml[0]), "password: secret123\n");
        assert_eq!(yaml[0].path, PathBuf::from("/out/app"));
    }

    #[test]
    fn test_txt_single_and_multiple_keys() {
        let single = encode_as(OutputFormat::Txt, &payload(&[("value", "42")])).unwrap();
        assert_eq!(single, vec![Artifact::new(PathBuf::from("/out/app"), "42")]);

        let multiple =
            encode_as(OutputFormat::Txt, &payload(&[("a", "1"), ("b", "2")])).unwrap();
        let paths: Vec<_> = multiple.iter().map(|a| a.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/out/app.a"), PathBuf::from("/out/app.b")]
        );
    }

    #[test]
    fn test_flatten_rejects_path_keys() {
        let result = encode_as(OutputFormat::Flatten, &payload(&[("../escape", "x")]));
        assert!(matches!(result, Err(SidekickError::MalformedSecret { .. })));
    }

    #[test]
    fn test_cert_requires_all_fields() {
        let data = payload(&[("certificate", "CERT"), ("private_key", "KEY")]);
        let result = encode_as(OutputFormat::Cert, &data);
        assert!(
            matches!(result, Err(SidekickError::MalformedSecret { format: "cert", reason }) if reason.contains("issuing_ca"))
        );
    }

    #[test]
    fn test_bundle_layout() {
        let data = payload(&[
            ("certificate", "CERT"),
            ("private_key", "KEY"),
            ("issuing_ca", "CA"),
        ]);
        let artifacts = encode_as(OutputFormat::Bundle, &data).unwrap();
        assert_eq!(artifacts.len(), 4);
        assert_eq!(artifacts[0].path, PathBuf::from("/out/app.pem"));
        assert_eq!(text(&artifacts[1]), "KEY\n");
        assert_eq!(artifacts[3].path, PathBuf::from("/out/app-bundle.pem"));
        assert_eq!(text(&artifacts[3]), "CERT\n\nCA");
    }

    #[test]
    fn test_credential_decodes_base64() {
        let data = payload(&[("private_key_data", "eyJ0eXBlIjoic2EifQ==")]);
        let artifacts = encode_as(OutputFormat::Credential, &data).unwrap();
        assert_eq!(text(&artifacts[0]), r#"{"type":"sa"}"#);

        let bad = payload(&[("private_key_data", "not base64!")]);
        assert!(matches!(
            encode_as(OutputFormat::Credential, &bad),
            Err(SidekickError::MalformedSecret { .. })
        ));
    }

    #[test]
    fn test_aws_profile() {
        let data = payload(&[
            ("access_key", "AKIA"),
            ("secret_key", "shh"),
            ("security_token", "tok"),
        ]);
        let artifacts = encode_as(OutputFormat::Aws, &data).unwrap();
        assert_eq!(
            text(&artifacts[0]),
            "[default]\naws_access_key_id = AKIA\naws_secret_access_key = shh\naws_session_token = tok\n"
        );

        let missing = payload(&[("access_key", "AKIA")]);
        assert!(matches!(
            encode_as(OutputFormat::Aws, &missing),
            Err(SidekickError::MalformedSecret { format: "aws", .. })
        ));
    }

    #[test]
    fn test_template_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("db.tpl");
        std::fs::write(&template, "postgres://{{user}}:{{password}}@db/app").unwrap();

        let mut resource = SecretResource::new(ResourceKind::Secret, "db");
        resource.template_file = Some(template);
        let data = payload(&[("user", "admin"), ("password", "p&ss")]);

        let artifacts =
            encode(OutputFormat::Template, Path::new("/out/db"), &resource, &data).unwrap();
        assert_eq!(text(&artifacts[0]), "postgres://admin:p&ss@db/app");
    }

    #[test]
    fn test_template_requires_file() {
        let result = encode_as(OutputFormat::Template, &payload(&[("a", "1")]));
        assert!(matches!(result, Err(SidekickError::MissingConfiguration(_))));
    }
}
