use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT Claims结构
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 用户id
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
}

impl Claims {
    pub fn new(user_id: i32, issuer: String, expiration_seconds: u64) -> Self {
        let now = Utc::now().timestamp().max(0) as usize;
        Self {
            sub: user_id.to_string(),
            exp: now + expiration_seconds as usize,
            iat: now,
            iss: issuer,
        }
    }

    pub fn user_id(&self) -> Result<i32> {
        self.sub
            .parse()
            .map_err(|_| anyhow!("invalid subject claim: {}", self.sub))
    }
}

/// JWT服务
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expiration: u64,
}

impl JwtService {
    pub fn new(secret: &str, issuer: String, expiration: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            expiration,
        }
    }

    /// 为用户签发访问令牌
    pub fn generate(&self, user_id: i32) -> Result<String> {
        let claims = Claims::new(user_id, self.issuer.clone(), self.expiration);
        encode(&Header::default(), &claims, &self.encoding_key).context("JWT encode error")
    }

    /// 验证令牌，返回其中的用户id
    pub fn verify(&self, token: &str) -> Result<i32> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).context("JWT decode error")?;
        token_data.claims.user_id()
    }

    /// 获取过期时间（秒）
    pub fn expiration(&self) -> u64 {
        self.expiration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_generate_and_verify() {
        let service = JwtService::new("test_secret", "quill".to_string(), 3600);

        let token = service.generate(42).unwrap();
        assert!(!token.is_empty());
        assert_eq!(service.verify(&token).unwrap(), 42);
    }

    #[test]
    fn test_jwt_rejects_foreign_tokens() {
        let service = JwtService::new("test_secret", "quill".to_string(), 3600);
        let other_secret = JwtService::new("other_secret", "quill".to_string(), 3600);
        let other_issuer = JwtService::new("test_secret", "someone-else".to_string(), 3600);

        assert!(service.verify(&other_secret.generate(1).unwrap()).is_err());
        assert!(service.verify(&other_issuer.generate(1).unwrap()).is_err());
        assert!(service.verify("not-a-token").is_err());
    }
}
