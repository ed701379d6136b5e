use crate::model::employee::NewEmployee;
use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Reads the onboarding seed: a JSON array of employees with plain passwords.
pub fn read_seed_file(path: &Path) -> Result<Vec<NewEmployee>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Seed file {} is not a valid employee list", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;

    #[test]
    fn reads_employee_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        fs::write(
            &path,
            r#"[{"name":"Hana","email":"hana@company.com","department":"HR","role":"hr_admin",
                "manager_id":null,"password":"password123",
                "balances":{"sick":1,"vacation":2,"personal":3}}]"#,
        )
        .unwrap();

        let seed = read_seed_file(&path).unwrap();
        assert_eq!(seed.len(), 1);
        assert_eq!(seed[0].role, Role::HrAdmin);
        assert_eq!(seed[0].balances.map(|b| b.vacation), Some(2));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_seed_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
