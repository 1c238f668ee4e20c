/// Value of the environment variable `name`, or `default` when unset or empty
pub fn get_env(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}
