use tracing::warn;

use crate::exercise_engine::{
    builder::{option_strings, TopicInfo},
    context::GenerationContext,
    difficulty::{clamp_range, Range, Tier, TierTable},
    distractors::near_integers,
    error::{EngineError, Result},
    models::Exercise,
    numeric::Hundredths,
};

pub const BASIC_OPERATIONS: TopicInfo = TopicInfo::new(1, "Operaciones básicas");
pub const POWERS: TopicInfo = TopicInfo::new(8, "Potencias");
pub const PERCENTAGES: TopicInfo = TopicInfo::new(10, "Porcentajes");

// ---------------------------------------------------------------------------
// T1 operaciones básicas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operation {
    /// Catalog symbols, plus their common ASCII spellings.
    fn parse(symbol: &str) -> Option<Operation> {
        match symbol.trim() {
            "+"             => Some(Operation::Add),
            "-" | "−"       => Some(Operation::Sub),
            "×" | "x" | "*" => Some(Operation::Mul),
            "÷" | "/" | ":" => Some(Operation::Div),
            _               => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Sub => "-",
            Operation::Mul => "×",
            Operation::Div => "÷",
        }
    }
}

const OPERAND_RANGES: TierTable<Range> = TierTable::new((1, 20), (1, 50), (1, 100));
const OPERATIONS: TierTable<&[&str]> =
    TierTable::new(&["+", "-"], &["+", "-", "×"], &["+", "-", "×", "÷"]);
const ALLOW_NEGATIVES: TierTable<bool> = TierTable::new(false, true, true);

/// Division is built backwards from a small quotient so it is always exact.
const QUOTIENT_RANGE: Range = (1, 12);

fn parse_operations(symbols: &[String]) -> Vec<Operation> {
    symbols.iter().filter_map(|s| Operation::parse(s)).collect()
}

pub fn generate_basic_operations(ctx: &mut GenerationContext<'_>) -> Result<Exercise> {
    let allow_negatives = ctx.limits.rule("permitirNegativos", &ALLOW_NEGATIVES);
    let operands = ctx.limits.range("numeros", &OPERAND_RANGES);
    // Negative operands would force negative sums.
    let (min, max) = if allow_negatives { operands } else { clamp_range(operands, 0, i64::MAX) };

    let mut operations = parse_operations(&ctx.limits.operations(&OPERATIONS));
    if operations.is_empty() {
        warn!(topic = ctx.topic.id, "catalog lists no known operation, using defaults");
        let defaults: Vec<String> = OPERATIONS.get(ctx.tier).iter().map(|s| s.to_string()).collect();
        operations = parse_operations(&defaults);
    }
    let op = *ctx.session.pick(&operations);

    let (a, b, result) = match op {
        Operation::Add => {
            let a = ctx.session.int(min, max);
            let b = ctx.session.int(min, max);
            (a, b, a + b)
        }
        Operation::Sub => {
            let mut a = ctx.session.int(min, max);
            let mut b = ctx.session.int(min, max);
            if !allow_negatives && a < b {
                std::mem::swap(&mut a, &mut b);
            }
            (a, b, a - b)
        }
        Operation::Mul => {
            let a = ctx.session.int(min, max);
            let b = ctx.session.int(min, max);
            (a, b, a * b)
        }
        Operation::Div => {
            let quotient = ctx.session.int(QUOTIENT_RANGE.0, QUOTIENT_RANGE.1);
            let b = ctx.session.int(QUOTIENT_RANGE.0, QUOTIENT_RANGE.1);
            (quotient * b, b, quotient)
        }
    };

    let sampler = ctx
        .distractors(result)
        .valid(move |v: &i64| allow_negatives || *v >= 0);
    let wrong = near_integers(ctx.session, result, 10, sampler)?;

    let mut options = vec![result];
    options.extend(wrong);

    let symbol = op.symbol();
    ctx.choice(
        format!("¿Cuánto es {a} {symbol} {b}?"),
        option_strings(&options),
        format!("Se resuelve la operación {a} {symbol} {b} = {result}."),
    )
}

// ---------------------------------------------------------------------------
// T8 potencias
// ---------------------------------------------------------------------------

const POWER_BASES: TierTable<Range> = TierTable::new((2, 9), (2, 12), (2, 15));
const POWER_EXPONENTS: TierTable<Range> = TierTable::new((2, 4), (2, 5), (2, 6));

// Catalog overrides are clamped so `base^exp` stays well inside i64.
const MAX_BASE: i64 = 50;
const MAX_EXPONENT: i64 = 10;

/// `b × b × ... × b`, `exp` factors.
fn expanded(base: i64, exp: i64) -> String {
    vec![base.to_string(); exp.max(1) as usize].join(" × ")
}

fn checked_power(base: i64, exp: i64) -> Option<i64> {
    u32::try_from(exp).ok().and_then(|e| base.checked_pow(e))
}

pub fn generate_powers(ctx: &mut GenerationContext<'_>) -> Result<Exercise> {
    let (bmin, bmax) = clamp_range(ctx.limits.range("base", &POWER_BASES), 2, MAX_BASE);
    let (emin, emax) = clamp_range(ctx.limits.range("exponente", &POWER_EXPONENTS), 2, MAX_EXPONENT);
    let base = ctx.session.int(bmin, bmax);
    let exp = ctx.session.int(emin, emax);

    if ctx.session.chance(0.5) {
        power_value(ctx, base, exp)
    } else {
        power_expansion(ctx, base, exp)
    }
}

fn power_value(ctx: &mut GenerationContext<'_>, base: i64, exp: i64) -> Result<Exercise> {
    let value = checked_power(base, exp).ok_or(EngineError::InvalidRange { min: base, max: exp })?;

    // base × exp is the classic slip; the others miscount factors.
    let structural = [Some(base * exp), checked_power(base, exp - 1), checked_power(base, exp + 1)];
    let sampler = ctx
        .distractors(value)
        .structural(structural.into_iter().flatten())
        .valid(|v: &i64| *v > 0);
    let wrong = near_integers(ctx.session, value, (value / 3).max(5), sampler)?;

    let mut options = vec![value];
    options.extend(wrong);

    ctx.choice(
        format!("Calcula el valor de la siguiente potencia:\n\n{base}^{exp}"),
        option_strings(&options),
        format!("{base}^{exp} significa multiplicar {base} por sí mismo {exp} veces."),
    )
}

fn power_expansion(ctx: &mut GenerationContext<'_>, base: i64, exp: i64) -> Result<Exercise> {
    let correct = expanded(base, exp);

    let structural = vec![format!("{base} × {exp}"), expanded(base, exp + 1), expanded(exp, base)];
    let wrong = ctx.distractors(correct.clone()).structural(structural).synthesize(
        ctx.session,
        |s| expanded(base, (exp + s.int(-2, 2)).max(2)),
        |step| expanded(base, exp + 2 + step as i64),
    )?;

    let mut options = vec![correct];
    options.extend(wrong);

    ctx.choice(
        format!("¿Cuál es la forma desarrollada de la potencia {base}^{exp}?"),
        options,
        format!("Una potencia {base}^{exp} es una multiplicación de {exp} factores iguales a {base}."),
    )
}

// ---------------------------------------------------------------------------
// T10 porcentajes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum PercentProblem {
    PartOfWhole,
    Increase,
    Discount,
}

const PERCENT_PROBLEMS: [PercentProblem; 3] =
    [PercentProblem::PartOfWhole, PercentProblem::Increase, PercentProblem::Discount];

const BASIC_PERCENTS: [i64; 5] = [5, 10, 20, 25, 50];
const PERCENT_AMOUNTS: TierTable<Range> = TierTable::new((40, 200), (100, 500), (200, 1000));

fn draw_percent(ctx: &mut GenerationContext<'_>) -> i64 {
    match ctx.tier {
        Tier::Basico     => *ctx.session.pick(&BASIC_PERCENTS),
        Tier::Intermedio => ctx.session.int(5, 40),
        Tier::Avanzado   => ctx.session.int(5, 70),
    }
}

pub fn generate_percentages(ctx: &mut GenerationContext<'_>) -> Result<Exercise> {
    let problem = *ctx.session.pick(&PERCENT_PROBLEMS);
    let percent = draw_percent(ctx);
    let (amin, amax) = ctx.limits.range("cantidad", &PERCENT_AMOUNTS);
    let base = ctx.session.int(amin.max(1), amax);

    let share = percent as f64 / 100.0 * base as f64;
    let (statement, result, explanation) = match problem {
        PercentProblem::PartOfWhole => (
            format!("¿Cuál es el {percent}% de {base}?"),
            share,
            format!("Se calcula como {base} × {percent}/100."),
        ),
        PercentProblem::Increase => (
            format!("Un producto cuesta {base} y aumenta un {percent}%. ¿Cuál es el nuevo precio?"),
            base as f64 + share,
            format!("Se suma el {percent}% al valor original: {base} × (1 + {percent}/100)."),
        ),
        PercentProblem::Discount => (
            format!(
                "Un producto cuesta {base} y tiene un descuento del {percent}%. ¿Cuál es el precio final?"
            ),
            base as f64 - share,
            format!("Se resta el {percent}% al valor original: {base} × (1 - {percent}/100)."),
        ),
    };

    let correct = Hundredths::from_f64(result);
    let wrong = ctx
        .distractors(correct)
        .valid(|v: &Hundredths| v.0 > 0)
        .synthesize(
            ctx.session,
            |s| Hundredths(correct.0 + s.int(-20, 20) * 100),
            |step| Hundredths(correct.0 + (step as i64 + 1) * 100),
        )?;

    let mut options = vec![correct];
    options.extend(wrong);

    ctx.choice(statement, option_strings(&options), explanation)
}
