use anyhow::{anyhow, Result};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use bcrypt::{hash, verify, DEFAULT_COST};

/// 密码加密算法类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordAlgorithm {
    #[default]
    Bcrypt,
    Argon2,
}

/// 密码服务trait
#[async_trait]
pub trait PasswordService: Send + Sync {
    /// 加密密码
    async fn hash(&self, password: &str) -> Result<String>;

    /// 验证密码
    async fn verify(&self, password: &str, hash: &str) -> Result<bool>;

    /// 获取使用的加密算法
    fn algorithm(&self) -> PasswordAlgorithm;
}

/// 默认密码服务实现
pub struct DefaultPasswordService {
    algorithm: PasswordAlgorithm,
    bcrypt_cost: u32,
}

impl DefaultPasswordService {
    pub fn new(algorithm: PasswordAlgorithm) -> Self {
        Self {
            algorithm,
            bcrypt_cost: DEFAULT_COST,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }
}

#[async_trait]
impl PasswordService for DefaultPasswordService {
    async fn hash(&self, password: &str) -> Result<String> {
        match self.algorithm {
            PasswordAlgorithm::Bcrypt => {
                hash(password, self.bcrypt_cost).map_err(|e| anyhow!("Bcrypt hash error: {}", e))
            }
            PasswordAlgorithm::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                let password_hash = Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| anyhow!("Argon2 hash error: {}", e))?;
                Ok(password_hash.to_string())
            }
        }
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        match self.algorithm {
            PasswordAlgorithm::Bcrypt => {
                verify(password, hash).map_err(|e| anyhow!("Bcrypt verify error: {}", e))
            }
            PasswordAlgorithm::Argon2 => {
                let parsed_hash =
                    PasswordHash::new(hash).map_err(|e| anyhow!("Argon2 parse hash error: {}", e))?;
                match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
                    Ok(()) => Ok(true),
                    Err(argon2::password_hash::Error::Password) => Ok(false),
                    Err(e) => Err(anyhow!("Argon2 verify error: {}", e)),
                }
            }
        }
    }

    fn algorithm(&self) -> PasswordAlgorithm {
        self.algorithm
    }
}
