use super::ExportError;
use std::io::Write;
use std::path::Path;

/// Export any serializable data structure to pretty-printed JSON
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<(), ExportError>
where
    T: serde::Serialize + ?Sized,
    P: AsRef<Path>,
{
    let json_data = serde_json::to_string_pretty(data)?;

    let mut file = std::fs::File::create(output_path)?;
    file.write_all(json_data.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sleep::{sleep_debt, SleepDebtLevel};
    use tempfile::NamedTempFile;

    #[test]
    fn test_export_json() {
        let debt = sleep_debt(&[], 8.0);
        let temp_file = NamedTempFile::new().unwrap();

        export_json(&debt, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let parsed: crate::sleep::SleepDebt = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.level, SleepDebtLevel::Low);
        assert!(content.contains("total_debt_hours"));
    }
}
