//! 密码哈希工具模块
//!
//! 使用 Argon2id 算法进行密码哈希和验证。引擎只通过 [`SecretHasher`]
//! 访问，从不保存或比较明文。

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// 密码哈希错误
#[derive(Debug)]
pub enum PasswordError {
    HashError(String),
    VerifyError(String),
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HashError(msg) => write!(f, "Password hash error: {}", msg),
            Self::VerifyError(msg) => write!(f, "Password verify error: {}", msg),
        }
    }
}

impl std::error::Error for PasswordError {}

impl From<PasswordError> for crate::errors::LinkVaultError {
    fn from(err: PasswordError) -> Self {
        crate::errors::LinkVaultError::password_hash(err.to_string())
    }
}

/// One-way hash + verify service
pub trait SecretHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl SecretHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        hash_password(plaintext)
    }

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordError> {
        verify_password(plaintext, digest)
    }
}

/// 对密码进行 Argon2id 哈希
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// 验证密码是否匹配哈希
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::VerifyError(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 检测字符串是否是 Argon2 哈希格式
pub fn is_argon2_hash(s: &str) -> bool {
    s.starts_with("$argon2")
}

/// 处理用户输入的新密码
///
/// - 如果输入为空或 None，返回 None（不设密码）
/// - 否则对密码进行哈希
pub fn process_new_password(
    hasher: &dyn SecretHasher,
    password: Option<&str>,
) -> Result<Option<String>, PasswordError> {
    match password {
        Some(pwd) if !pwd.is_empty() => hasher.hash(pwd).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "test_password_123";
        let hash = hash_password(password).expect("hash should succeed");

        assert!(is_argon2_hash(&hash));
        assert!(verify_password(password, &hash).expect("verify should succeed"));
        assert!(!verify_password("wrong_password", &hash).expect("verify should succeed"));
    }

    #[test]
    fn test_verify_rejects_malformed_digest() {
        assert!(verify_password("secret", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_process_new_password() {
        let hasher = Argon2Hasher;
        assert!(process_new_password(&hasher, None).unwrap().is_none());
        assert!(process_new_password(&hasher, Some("")).unwrap().is_none());

        let hashed = process_new_password(&hasher, Some("secret"))
            .unwrap()
            .expect("non-empty password is hashed");
        assert_ne!(hashed, "secret");
        assert!(hasher.verify("secret", &hashed).unwrap());
    }
}
