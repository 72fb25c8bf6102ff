use rand::Rng;
use rand::rngs::OsRng;

/// Characters a human can read back without confusing 0/O or 1/I/L.
pub const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";

/// Shortest code handed out. 8 symbols over 31 characters is ~39.6 bits.
pub const MIN_CODE_LENGTH: usize = 8;

/// Produces short, unguessable access codes from the OS random source.
#[derive(Debug, Clone, Copy)]
pub struct AccessCodeGenerator {
    length: usize,
}

impl AccessCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(MIN_CODE_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn generate(&self) -> String {
        let mut rng = OsRng;
        (0..self.length)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }

    /// Entropy of one code in bits
    pub fn entropy_bits(&self) -> f64 {
        self.length as f64 * (CODE_ALPHABET.len() as f64).log2()
    }
}

impl Default for AccessCodeGenerator {
    fn default() -> Self {
        Self::new(MIN_CODE_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_code_shape() {
        let generator = AccessCodeGenerator::default();
        for _ in 0..100 {
            let code = generator.generate();
            assert_eq!(code.len(), MIN_CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_length_is_clamped() {
        let generator = AccessCodeGenerator::new(4);
        assert_eq!(generator.length(), MIN_CODE_LENGTH);
        assert_eq!(generator.generate().len(), MIN_CODE_LENGTH);

        let generator = AccessCodeGenerator::new(12);
        assert_eq!(generator.generate().len(), 12);
    }

    #[test]
    fn test_entropy_floor() {
        assert!(AccessCodeGenerator::default().entropy_bits() >= 36.0);
    }

    #[test]
    fn test_codes_do_not_repeat() {
        let generator = AccessCodeGenerator::default();
        let codes: HashSet<String> = (0..1000).map(|_| generator.generate()).collect();
        assert_eq!(codes.len(), 1000);
    }
}
