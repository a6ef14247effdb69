use crate::config::Config;
use crate::errors::{Error, Result};
use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode, errors::ErrorKind,
};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub email: String,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
}

impl Claims {
    pub fn new(email: String, config: &Config) -> Self {
        let iat = Utc::now().timestamp();
        Self {
            email,
            iat: iat as usize,
            exp: (iat + config.token_ttl_secs) as usize,
            iss: config.token_issuer.clone(),
        }
    }
}

pub fn encode_jwt(claim: &Claims, config: &Config) -> Result<String> {
    let token = encode(
        &Header::default(),
        claim,
        &EncodingKey::from_secret(config.token_secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_jwt(token: &str, config: &Config) -> Result<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.set_issuer(&[config.token_issuer.as_str()]);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.token_secret.as_bytes()),
        &validation,
    )
    .map_err(|error| match error.kind() {
        ErrorKind::ExpiredSignature => Error::TokenExpired,
        _ => Error::InvalidToken,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_carries_the_email() {
        let config = Config::for_tests();
        let token = encode_jwt(&Claims::new("a@x.com".into(), &config), &config).expect("encode");
        let data = decode_jwt(&token, &config).expect("decode");
        assert_eq!(data.claims.email, "a@x.com");
        assert_eq!(data.claims.exp - data.claims.iat, 3600);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let config = Config::for_tests();
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            email: "a@x.com".into(),
            iat: now - 7200,
            exp: now - 3600,
            iss: config.token_issuer.clone(),
        };
        let token = encode_jwt(&claims, &config).expect("encode");
        assert!(matches!(decode_jwt(&token, &config), Err(Error::TokenExpired)));
    }

    #[test]
    fn foreign_secret_or_issuer_is_invalid() {
        let config = Config::for_tests();
        let token = encode_jwt(&Claims::new("a@x.com".into(), &config), &config).expect("encode");

        let mut other = config.clone();
        other.token_secret = "another-secret".into();
        assert!(matches!(decode_jwt(&token, &other), Err(Error::InvalidToken)));

        let mut other = config.clone();
        other.token_issuer = "someone-else".into();
        assert!(matches!(decode_jwt(&token, &other), Err(Error::InvalidToken)));

        assert!(matches!(decode_jwt("garbage", &config), Err(Error::InvalidToken)));
    }
}
