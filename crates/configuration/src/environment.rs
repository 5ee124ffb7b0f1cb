use std::fmt;

/// Prefix shared by every DaQSS environment variable.
pub const ENV_PREFIX: &str = "DAQSS";

/// Host used when `DAQSS_HOST` is not set.
pub const DEFAULT_HOST: &str = "localhost:5432";

/// Database name used when `DAQSS_DATABASE` is not set.
pub const DEFAULT_DATABASE: &str = "daqss";

/// The environment variables that configure the connection to the DaQSS database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentVariables {
    /// The name of the database that holds the data of DaQSS.
    DaqssDatabase,
    /// Address and port of the database server, e.g. `0.0.0.0:5432` or `myhost.com:5432`.
    DaqssHost,
    /// The password used for connecting to the database. Mandatory.
    DaqssPassword,
    /// The username used for connecting to the database. Mandatory.
    DaqssUsername,
}

impl EnvironmentVariables {
    pub const ALL: [EnvironmentVariables; 4] = [
        EnvironmentVariables::DaqssDatabase,
        EnvironmentVariables::DaqssHost,
        EnvironmentVariables::DaqssPassword,
        EnvironmentVariables::DaqssUsername,
    ];

    /// The variable name as it appears in the process environment.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentVariables::DaqssDatabase => "DAQSS_DATABASE",
            EnvironmentVariables::DaqssHost => "DAQSS_HOST",
            EnvironmentVariables::DaqssPassword => "DAQSS_PASSWORD",
            EnvironmentVariables::DaqssUsername => "DAQSS_USERNAME",
        }
    }

    /// The settings key the variable maps to once the prefix is stripped.
    pub fn key(&self) -> &'static str {
        match self {
            EnvironmentVariables::DaqssDatabase => "database",
            EnvironmentVariables::DaqssHost => "host",
            EnvironmentVariables::DaqssPassword => "password",
            EnvironmentVariables::DaqssUsername => "username",
        }
    }

    pub fn is_mandatory(&self) -> bool {
        matches!(
            self,
            EnvironmentVariables::DaqssPassword | EnvironmentVariables::DaqssUsername
        )
    }

    pub fn default_value(&self) -> Option<&'static str> {
        match self {
            EnvironmentVariables::DaqssDatabase => Some(DEFAULT_DATABASE),
            EnvironmentVariables::DaqssHost => Some(DEFAULT_HOST),
            EnvironmentVariables::DaqssPassword | EnvironmentVariables::DaqssUsername => None,
        }
    }
}

impl fmt::Display for EnvironmentVariables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
