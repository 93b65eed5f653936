// ── Credential resolution (without CLI flags) ──
//
// Password chain: `ZABTREE_PASSWORD`, then the system keyring, then the
// profile's `password_file`, then plaintext `password`.

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

use crate::{ConfigError, Profile};

/// Keyring service name for stored passwords.
pub const KEYRING_SERVICE: &str = "zabtree";

/// Environment variable consulted before the keyring.
pub const PASSWORD_ENV: &str = "ZABTREE_PASSWORD";

/// Keyring account for a profile's password.
pub fn keyring_account(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Resolve the password for `profile` from the credential chain.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_from(profile, profile_name, std::env::var(PASSWORD_ENV).ok(), || {
        keyring_lookup(profile_name)
    })
}

fn keyring_lookup(profile_name: &str) -> Option<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_account(profile_name)).ok()?;
    entry.get_password().ok()
}

fn resolve_password_from(
    profile: &Profile,
    profile_name: &str,
    env: Option<String>,
    keyring: impl FnOnce() -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Env var
    if let Some(pw) = env {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Some(pw) = keyring() {
        return Ok(SecretString::from(pw));
    }

    // 3. Password file
    if let Some(ref path) = profile.password_file {
        return read_password_file(path);
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Read a password file. The trailing line break is not part of the
/// password.
pub fn read_password_file(path: &Path) -> Result<SecretString, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Validation {
        field: "password_file".into(),
        reason: format!("{}: {e}", path.display()),
    })?;
    let password = raw.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(ConfigError::Validation {
            field: "password_file".into(),
            reason: format!("{} is empty", path.display()),
        });
    }
    Ok(SecretString::from(password.to_owned()))
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_account(profile_name))
        .map_err(|e| ConfigError::Keyring(e.to_string()))?;
    entry
        .set_password(password.expose_secret())
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    fn profile() -> Profile {
        Profile {
            server: "https://zabbix.example.com".into(),
            user: Some("Admin".into()),
            ..Profile::default()
        }
    }

    fn resolve(profile: &Profile, env: Option<&str>, keyring: Option<&str>) -> Result<String, ConfigError> {
        resolve_password_from(profile, "default", env.map(Into::into), || keyring.map(Into::into))
            .map(|s| s.expose_secret().to_owned())
    }

    #[test]
    fn env_wins_over_everything() {
        let p = Profile {
            password: Some("plain".into()),
            ..profile()
        };
        assert_eq!(resolve(&p, Some("from-env"), Some("from-keyring")).unwrap(), "from-env");
        assert_eq!(resolve(&p, None, Some("from-keyring")).unwrap(), "from-keyring");
        assert_eq!(resolve(&p, None, None).unwrap(), "plain");
    }

    #[test]
    fn password_file_beats_plaintext() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "s3cret").unwrap();
        let p = Profile {
            password: Some("plain".into()),
            password_file: Some(file.path().to_path_buf()),
            ..profile()
        };
        assert_eq!(resolve(&p, None, None).unwrap(), "s3cret");
    }

    #[test]
    fn nothing_configured_is_no_credentials() {
        let err = resolve(&profile(), None, None).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { ref profile } if profile == "default"));
    }

    #[test]
    fn password_file_keeps_inner_whitespace() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, " pass word \r\n").unwrap();
        let pw = read_password_file(file.path()).unwrap();
        assert_eq!(pw.expose_secret(), " pass word ");
    }

    #[test]
    fn empty_or_missing_password_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            read_password_file(file.path()),
            Err(ConfigError::Validation { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_password_file(&dir.path().join("nope")),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn keyring_account_is_scoped_by_profile() {
        assert_eq!(keyring_account("prod"), "prod/password");
    }
}
