use super::connect_params::ConnectParams;
use crate::{DqError, DqResult};

/// A builder for [`ConnectParams`].
///
/// ```rust,no_run
/// use dqconnect::ConnectParams;
///
/// let params = ConnectParams::builder()
///     .hostname("dbhost")
///     .port(54321)
///     .dbname("TestDB")
///     .dbuser("meier")
///     .password("schLau")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConnectParamsBuilder {
    hostname: Option<String>,
    port: Option<u16>,
    dbname: Option<String>,
    dbuser: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    charset: Option<String>,
    #[serde(default)]
    autocommit: bool,
    protocol_version: Option<i32>,
}

impl ConnectParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hostname<H: AsRef<str>>(&mut self, hostname: H) -> &mut Self {
        self.hostname = Some(hostname.as_ref().to_string());
        self
    }

    pub fn port(&mut self, port: u16) -> &mut Self {
        self.port = Some(port);
        self
    }

    pub fn dbname<D: AsRef<str>>(&mut self, dbname: D) -> &mut Self {
        self.dbname = Some(dbname.as_ref().to_string());
        self
    }

    pub fn dbuser<U: AsRef<str>>(&mut self, dbuser: U) -> &mut Self {
        self.dbuser = Some(dbuser.as_ref().to_string());
        self
    }

    pub fn password<P: AsRef<str>>(&mut self, password: P) -> &mut Self {
        self.password = Some(password.as_ref().to_string());
        self
    }

    pub fn charset<C: AsRef<str>>(&mut self, charset: C) -> &mut Self {
        self.charset = Some(charset.as_ref().to_string());
        self
    }

    pub fn autocommit(&mut self, autocommit: bool) -> &mut Self {
        self.autocommit = autocommit;
        self
    }

    /// Overrides the protocol version requested at handshake; mainly
    /// useful against old servers.
    pub fn protocol_version(&mut self, protocol_version: i32) -> &mut Self {
        self.protocol_version = Some(protocol_version);
        self
    }

    /// Constructs the `ConnectParams`.
    ///
    /// # Errors
    ///
    /// `DqError::Usage` if the hostname is missing.
    pub fn build(&self) -> DqResult<ConnectParams> {
        let host = self
            .hostname
            .clone()
            .ok_or(DqError::Usage("hostname is missing"))?;
        Ok(ConnectParams::new(
            host,
            self.port,
            self.dbname.clone(),
            self.dbuser.clone(),
            self.password.clone(),
            self.charset.clone(),
            self.autocommit,
            self.protocol_version,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectParamsBuilder;

    #[test]
    fn builder_requires_a_hostname() {
        assert!(ConnectParamsBuilder::new().build().is_err());
        assert!(ConnectParamsBuilder::new().hostname("h").build().is_ok());
    }

    #[test]
    fn builder_sets_all_fields() {
        let params = ConnectParamsBuilder::new()
            .hostname("h")
            .port(1234)
            .dbname("DB")
            .dbuser("u")
            .password("p")
            .charset("utf8")
            .autocommit(true)
            .build()
            .unwrap();
        assert_eq!(params.host(), "h");
        assert_eq!(params.port(), 1234);
        assert_eq!(params.dbname(), "DB");
        assert_eq!(params.user(), Some("u"));
        assert_eq!(params.password(), Some("p"));
        assert!(params.autocommit());
    }
}
