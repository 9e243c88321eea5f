// src/utils/mod.rs

pub mod random;
pub mod time;

/// Rounded percentage of `part` over `whole`; 0 when `whole` is 0.
pub fn percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(32, 40), 80);
        assert_eq!(percentage(0, 0), 0);
    }
}
