//! 敏感配置解密
//!
//! 敏感配置（如数据库密码）在配置中心以私钥加密后 base64 存储，
//! 客户端使用框架统一配置中的 `publicKey` 解密。

use base64::{engine::general_purpose, Engine as _};
use num_bigint::BigUint;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;

use crate::error::GconfError;

/// 框架统一配置中公钥的 key
pub const PUBLIC_KEY: &str = "publicKey";

/// 使用 base64 编码的 PKIX 公钥解密 base64 编码的密文
///
/// 密文为私钥按 PKCS#1 v1.5 签名填充加密的结果，解密后去掉填充返回原文。
///
/// # 示例
/// ```no_run
/// use gconf::crypto::rsa_public_decrypt;
///
/// let password = rsa_public_decrypt("MIGfMA0G...", "w3bWtatR...").unwrap_or_default();
/// ```
pub fn rsa_public_decrypt(public_key: &str, encrypted: &str) -> Result<String, GconfError> {
    let cipher = general_purpose::STANDARD
        .decode(encrypted)
        .map_err(|e| GconfError::Decrypt(format!("invalid base64 cipher: {}", e)))?;
    let der = general_purpose::STANDARD
        .decode(public_key)
        .map_err(|e| GconfError::Decrypt(format!("invalid base64 public key: {}", e)))?;
    let key = RsaPublicKey::from_public_key_der(&der)
        .map_err(|e| GconfError::Decrypt(format!("invalid public key: {}", e)))?;

    let n = BigUint::from_bytes_be(&key.n().to_bytes_be());
    let e = BigUint::from_bytes_be(&key.e().to_bytes_be());
    let plain = BigUint::from_bytes_be(&cipher).modpow(&e, &n).to_bytes_be();

    Ok(String::from_utf8_lossy(strip_padding(&plain)).into_owned())
}

// 大整数转字节时已去掉前导 0，填充形如 01 ff .. ff 00 原文
fn strip_padding(block: &[u8]) -> &[u8] {
    let skip = (2..block.len().saturating_sub(1))
        .find(|&i| block[i] == 0xff && block[i + 1] == 0)
        .map(|i| i + 2)
        .unwrap_or(0);
    &block[skip..]
}
