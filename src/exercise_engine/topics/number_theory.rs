use crate::exercise_engine::{
    builder::{option_strings, TopicInfo},
    context::GenerationContext,
    difficulty::{Range, TierTable},
    error::Result,
    models::Exercise,
    numeric::{divisors, is_prime, prime_in_range},
};

pub const PRIMES: TopicInfo = TopicInfo::new(3, "Números primos");
pub const MULTIPLES_AND_DIVISORS: TopicInfo = TopicInfo::new(5, "Múltiplos y divisores");

const PRIME_RANGES: TierTable<Range> = TierTable::new((2, 30), (2, 100), (50, 200));
const BASE_RANGES: TierTable<Range> = TierTable::new((2, 20), (3, 40), (4, 60));

// ---------------------------------------------------------------------------
// T3 números primos
// ---------------------------------------------------------------------------

pub fn generate_primes(ctx: &mut GenerationContext<'_>) -> Result<Exercise> {
    let (min, max) = ctx.limits.range("numeros", &PRIME_RANGES);
    let prime = prime_in_range(ctx.session, min, max, ctx.max_attempts);

    // Composites from the same range; multiples of the prime once it runs dry.
    let low = min.max(4);
    let wrong = ctx
        .distractors(prime)
        .valid(|n: &i64| *n > 1 && !is_prime(*n))
        .synthesize(ctx.session, |s| s.int(low, max), |step| prime * (step as i64 + 2))?;

    let mut options = vec![prime];
    options.extend(wrong);

    ctx.choice(
        "¿Cuál de los siguientes números es primo?".to_string(),
        option_strings(&options),
        format!("{prime} solo es divisible por 1 y por sí mismo; los demás tienen más divisores."),
    )
}

// ---------------------------------------------------------------------------
// T5 múltiplos y divisores
// ---------------------------------------------------------------------------

pub fn generate_multiples_and_divisors(ctx: &mut GenerationContext<'_>) -> Result<Exercise> {
    let (min, max) = ctx.limits.range("numeros", &BASE_RANGES);
    let base = ctx.session.int(min.max(2), max);

    if ctx.session.chance(0.5) {
        multiple_of(ctx, base)
    } else {
        divisor_of(ctx, base)
    }
}

fn multiple_of(ctx: &mut GenerationContext<'_>, base: i64) -> Result<Exercise> {
    let correct = base * ctx.session.int(2, 10);

    let wrong = ctx
        .distractors(correct)
        .valid(move |n: &i64| *n > 0 && n % base != 0)
        .synthesize(ctx.session, |s| s.int(base + 1, base * 12), |step| correct + step as i64 + 1)?;

    let mut options = vec![correct];
    options.extend(wrong);

    ctx.choice(
        format!("¿Cuál de los siguientes números es múltiplo de {base}?"),
        option_strings(&options),
        format!("Un número es múltiplo de {base} si se obtiene multiplicando {base} por un número entero."),
    )
}

fn divisor_of(ctx: &mut GenerationContext<'_>, base: i64) -> Result<Exercise> {
    let n = ctx.session.int(base * 2, base * 20);
    let proper: Vec<i64> = divisors(n).into_iter().filter(|d| *d != n).collect();
    let correct = if proper.is_empty() { 1 } else { *ctx.session.pick(&proper) };

    // Anything above n cannot divide it.
    let wrong = ctx
        .distractors(correct)
        .valid(move |d: &i64| *d > 1 && n % d != 0)
        .synthesize(ctx.session, |s| s.int(2, n - 1), |step| n + step as i64 + 1)?;

    let mut options = vec![correct];
    options.extend(wrong);

    ctx.choice(
        format!("¿Cuál de los siguientes números es divisor de {n}?"),
        option_strings(&options),
        format!("Un número es divisor de {n} si al dividir {n} por ese número el resto es 0."),
    )
}
