//! Prime capacities for the open-addressing table.
//!
//! A prime table length guarantees that every probe step in `1..capacity`
//! is coprime with the length, so a probe sequence visits every slot.

/// Returns `true` if `n` is prime.
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut d = 5usize;
    while d.saturating_mul(d) <= n {
        if n % d == 0 || n % (d + 2) == 0 {
            return false;
        }
        d += 6;
    }
    true
}

/// Smallest prime greater than or equal to `n`.
///
/// ```
/// use matrixkit_hashmap::primes::next_prime;
///
/// assert_eq!(next_prime(0), 2);
/// assert_eq!(next_prime(277), 277);
/// assert_eq!(next_prime(278), 281);
/// ```
pub fn next_prime(n: usize) -> usize {
    if n <= 2 {
        return 2;
    }
    let mut candidate = if n % 2 == 0 { n + 1 } else { n };
    while !is_prime(candidate) {
        candidate += 2;
    }
    candidate
}
