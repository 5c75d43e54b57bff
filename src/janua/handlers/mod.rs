pub mod health;
pub use self::health::health;

pub mod register;
pub use self::register::register;

pub mod login;
pub use self::login::login;

pub mod exists;
pub use self::exists::exists;

pub mod profile;
pub use self::profile::update_profile;

pub mod password;
pub use self::password::change_password;

// common functions for the handlers
use regex::Regex;

const USERNAME_MIN_LENGTH: usize = 3;
const USERNAME_MAX_LENGTH: usize = 32;
const PASSWORD_MIN_LENGTH: usize = 8;
const PASSWORD_MAX_LENGTH: usize = 128;

pub fn valid_username(username: &str) -> bool {
    let length = username.len();
    if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&length) {
        return false;
    }

    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").map_or(false, |re| re.is_match(username))
}

pub fn valid_password(password: &str) -> bool {
    (PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&password.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_username() {
        assert!(valid_username("alice"));
        assert!(valid_username("alice-smith"));
        assert!(valid_username("a2c"));
        assert!(valid_username("Alice_Smith.99"));

        assert!(!valid_username("al"));
        assert!(!valid_username(&"a".repeat(33)));
        assert!(!valid_username("-alice"));
        assert!(!valid_username("alice smith"));
        assert!(!valid_username("alice@example.com"));
        assert!(!valid_username(""));
    }

    #[test]
    fn test_valid_password() {
        assert!(valid_password("12345678"));
        assert!(valid_password(&"p".repeat(128)));

        assert!(!valid_password("1234567"));
        assert!(!valid_password(&"p".repeat(129)));
        assert!(!valid_password(""));
    }
}
