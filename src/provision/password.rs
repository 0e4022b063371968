use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const SYMBOLS: &[u8] = b"!@#$%^&*()+_-=}{[]|:;\"/?.><,`~";

/// Random password of `length` upper-case, lower-case and symbol characters.
///
/// Uses the thread-local CSPRNG. Every class appears at least once when
/// `length` allows it.
pub fn generate_password(length: usize) -> String {
    let mut rng = rand::rng();
    let classes = [UPPERCASE, LOWERCASE, SYMBOLS];
    let pool = classes.concat();

    let mut chars: Vec<u8> = classes
        .iter()
        .take(length)
        .filter_map(|class| class.choose(&mut rng).copied())
        .collect();
    while chars.len() < length {
        chars.push(pool[rng.random_range(0..pool.len())]);
    }
    chars.shuffle(&mut rng);

    chars.into_iter().map(char::from).collect()
}
