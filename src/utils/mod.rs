pub mod password;

/// URL-safe alphabet for link identifiers (62^6 ≈ 5.7e10 ids at the default length)
pub const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Upper bound for identifiers we accept on lookup
const MAX_ID_LENGTH: usize = 64;

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    // 随机选择字母和数字
    iter::repeat_with(|| ID_ALPHABET[rand::random_range(0..ID_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// Whether `id` could have come out of the generator
pub fn is_valid_link_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_ID_LENGTH && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Source of candidate link identifiers
///
/// Uniqueness is not the generator's job: the store rejects collisions on
/// insert and the caller asks for another candidate.
pub trait IdGenerator: Send + Sync {
    fn generate(&self, length: usize) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self, length: usize) -> String {
        generate_random_code(length)
    }
}
