pub struct SmtpEmailSenderConfig {
    pub host: String,
    pub port: u16,

    /// Use implicit TLS, otherwise connection is unencrypted
    pub tls: bool,

    /// Username and password
    pub credentials: Option<(String, String)>,

    /// Address in `From` header, e.g. `Teamboard <no-reply@teamboard.local>`
    pub sender: String,
}
