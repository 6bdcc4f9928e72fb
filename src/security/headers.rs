use crate::config::Environment;

const CSP_DIRECTIVES: &[&str] = &[
    "default-src 'self'",
    "script-src 'self' 'unsafe-inline' 'unsafe-eval' cdn.jsdelivr.net code.jquery.com cdn.datatables.net cdnjs.cloudflare.com",
    "style-src 'self' 'unsafe-inline' cdn.jsdelivr.net fonts.googleapis.com fonts.bunny.net cdn.datatables.net cdnjs.cloudflare.com",
    "font-src 'self' data: fonts.gstatic.com fonts.bunny.net cdn.jsdelivr.net cdnjs.cloudflare.com",
    "img-src 'self' data: https: blob:",
    "connect-src 'self'",
    "frame-ancestors 'self'",
    "form-action 'self'",
    "base-uri 'self'",
    "object-src 'none'",
    "media-src 'self'",
    "manifest-src 'self'",
    "worker-src 'self' blob:",
];

/// Dev servers and hot reload talk over websockets on localhost.
const DEV_CONNECT_SRC: &str = "connect-src 'self' ws: wss: http://localhost:* http://127.0.0.1:*";

const HSTS: &str = "max-age=31536000; includeSubDomains; preload";

pub fn content_security_policy(env: Environment) -> String {
    let mut directives = CSP_DIRECTIVES.to_vec();
    if env.is_local() {
        directives.push(DEV_CONNECT_SRC);
    }
    directives.join("; ")
}

/// Headers set on every API response.
pub fn security_headers(env: Environment) -> Vec<(&'static str, String)> {
    let mut headers = vec![
        ("X-Content-Type-Options", "nosniff".to_string()),
        ("X-Frame-Options", "SAMEORIGIN".to_string()),
        ("X-XSS-Protection", "1; mode=block".to_string()),
        ("Referrer-Policy", "strict-origin-when-cross-origin".to_string()),
        (
            "Permissions-Policy",
            "geolocation=(), microphone=(), camera=(), payment=()".to_string(),
        ),
    ];

    if env.is_production() {
        headers.push(("Strict-Transport-Security", HSTS.to_string()));
    }

    headers.push(("Content-Security-Policy", content_security_policy(env)));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(headers: &[(&str, String)], name: &str) -> Option<String> {
        headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.clone())
    }

    #[test]
    fn hsts_only_in_production() {
        let prod = security_headers(Environment::Production);
        let local = security_headers(Environment::Local);
        assert!(find(&prod, "Strict-Transport-Security").is_some());
        assert!(find(&local, "Strict-Transport-Security").is_none());
        assert_eq!(find(&local, "X-Frame-Options").as_deref(), Some("SAMEORIGIN"));
    }

    #[test]
    fn local_csp_opens_dev_connections() {
        let local = content_security_policy(Environment::Local);
        let prod = content_security_policy(Environment::Production);
        assert!(local.ends_with(DEV_CONNECT_SRC));
        assert!(!prod.contains("ws:"));
        assert!(prod.starts_with("default-src 'self'; script-src"));
        assert!(prod.contains("object-src 'none'"));
    }
}
