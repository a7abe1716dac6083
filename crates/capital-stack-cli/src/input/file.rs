use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a stack, layer, answers or catalog document.
///
/// `.yaml` / `.yml` files are parsed as YAML, everything else as JSON.
pub fn read_document<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let parsed = if is_yaml(&canonical) {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse JSON '{}': {}", canonical.display(), e))?
    };
    Ok(parsed)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

/// Resolve relative to the working directory and require an existing regular file.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }
    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use capital_stack_core::schedule::layer::CapitalStackLayer;
    use std::io::Write;

    #[test]
    fn reads_yaml_by_extension() {
        let mut f = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            f,
            "instrument_id: term-loan\namount: \"250000\"\nrate: \"8.5\"\nterm_months: 60\nstart_year: 2025\nstart_month: 4"
        )
        .unwrap();
        let layer: CapitalStackLayer = read_document(f.path().to_str().unwrap()).unwrap();
        assert_eq!(layer.instrument_id, "term-loan");
        assert_eq!(layer.term_months, 60);
    }

    #[test]
    fn reads_json_otherwise() {
        let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(f, r#"{{"org_type":"llc","priorities":["speed"]}}"#).unwrap();
        let answers: capital_stack_core::finder::FinderAnswers =
            read_document(f.path().to_str().unwrap()).unwrap();
        assert_eq!(answers.priorities.len(), 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_document::<serde_json::Value>("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
