//! Primes, factorization and smooth numbers.

/// All primes `<= max`, by the sieve of Eratosthenes.
pub fn primes_up_to(max: u64) -> Vec<u64> {
    if max < 2 {
        return Vec::new();
    }
    let n = max as usize;
    let mut composite = vec![false; n + 1];
    let mut primes = Vec::new();
    for i in 2..=n {
        if composite[i] {
            continue;
        }
        primes.push(i as u64);
        let mut multiple = i * i;
        while multiple <= n {
            composite[multiple] = true;
            multiple += i;
        }
    }
    primes
}

/// Prime factorization as `(prime, exponent)` pairs in ascending order.
///
/// `0` and `1` have no prime factors.
pub fn prime_factors(mut n: u64) -> Vec<(u64, u32)> {
    let mut factors = Vec::new();
    if n < 2 {
        return factors;
    }
    let mut p = 2;
    while p <= n / p {
        if n % p == 0 {
            let mut exponent = 0;
            while n % p == 0 {
                n /= p;
                exponent += 1;
            }
            factors.push((p, exponent));
        }
        p += if p == 2 { 1 } else { 2 };
    }
    if n > 1 {
        factors.push((n, 1));
    }
    factors
}

/// True when no prime factor of `n` exceeds `limit`.
pub fn is_smooth(n: u64, limit: u64) -> bool {
    n != 0 && prime_factors(n).iter().all(|&(p, _)| p <= limit)
}

fn is_smooth_with(mut n: u64, primes: &[u64]) -> bool {
    if n == 0 {
        return false;
    }
    for &p in primes {
        while n % p == 0 {
            n /= p;
        }
        if n == 1 {
            break;
        }
    }
    n == 1
}

/// Every `limit`-smooth integer in `2..=max`, ascending.
pub fn smooth_numbers(limit: u64, max: u64) -> Vec<u64> {
    // no prime above max divides anything in range
    let primes = primes_up_to(limit.min(max));
    if primes.is_empty() {
        return Vec::new();
    }
    (2..=max).filter(|&n| is_smooth_with(n, &primes)).collect()
}
