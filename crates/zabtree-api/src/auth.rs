use secrecy::SecretString;

/// Credentials for authenticating with a Zabbix frontend.
#[derive(Debug, Clone)]
pub enum Credentials {
    Password {
        user: String,
        password: SecretString,
    },
    HttpBasic {
        user: String,
        password: SecretString,
    },
}
