//! Shared templates for topics 56 to 85.
//!
//! Each topic in the block declares which [`GenericTemplate`] it uses in
//! [`GENERIC_TOPICS`].  [`GenericTemplate::for_topic`] is total: an ID with no
//! declaration gets the probability template, so the block can grow before
//! its table does.

use crate::exercise_engine::{
    builder::{option_strings, TopicInfo},
    context::GenerationContext,
    difficulty::{clamp_range, Range, Tier, TierTable},
    distractors::near_integers,
    error::Result,
    models::Exercise,
    numeric::format_number,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericTemplate {
    ComplementAngle,
    PowerEvaluation,
    MatrixDeterminant,
    PowerRuleDerivative,
    ProbabilityRatio,
}

use GenericTemplate::*;

pub const GENERIC_TOPICS: [(TopicInfo, GenericTemplate); 30] = [
    (TopicInfo::new(56, "Razones trigonométricas"),              ComplementAngle),
    (TopicInfo::new(57, "Resolución de triángulos rectángulos"), ComplementAngle),
    (TopicInfo::new(58, "Identidades trigonométricas"),          ComplementAngle),
    (TopicInfo::new(59, "Ángulos en la circunferencia"),         ComplementAngle),
    (TopicInfo::new(60, "Funciones exponenciales"),              PowerEvaluation),
    (TopicInfo::new(61, "Logaritmos"),                           PowerEvaluation),
    (TopicInfo::new(62, "Ecuaciones exponenciales"),             PowerEvaluation),
    (TopicInfo::new(63, "Crecimiento y decrecimiento"),          PowerEvaluation),
    (TopicInfo::new(64, "Números complejos"),                    MatrixDeterminant),
    (TopicInfo::new(65, "Operaciones con complejos"),            MatrixDeterminant),
    (TopicInfo::new(66, "Matrices"),                             MatrixDeterminant),
    (TopicInfo::new(67, "Operaciones con matrices"),             MatrixDeterminant),
    (TopicInfo::new(68, "Determinantes"),                        MatrixDeterminant),
    (TopicInfo::new(69, "Sistemas y matrices"),                  MatrixDeterminant),
    (TopicInfo::new(70, "Matriz inversa"),                       MatrixDeterminant),
    (TopicInfo::new(71, "Límites"),                              PowerRuleDerivative),
    (TopicInfo::new(72, "Continuidad"),                          PowerRuleDerivative),
    (TopicInfo::new(73, "Derivadas"),                            PowerRuleDerivative),
    (TopicInfo::new(74, "Reglas de derivación"),                 PowerRuleDerivative),
    (TopicInfo::new(75, "Aplicaciones de la derivada"),          PowerRuleDerivative),
    (TopicInfo::new(76, "Optimización"),                         PowerRuleDerivative),
    (TopicInfo::new(77, "Integrales indefinidas"),               PowerRuleDerivative),
    (TopicInfo::new(78, "Integrales definidas"),                 PowerRuleDerivative),
    (TopicInfo::new(79, "Áreas bajo la curva"),                  PowerRuleDerivative),
    (TopicInfo::new(80, "Ecuaciones diferenciales"),             PowerRuleDerivative),
    (TopicInfo::new(81, "Combinatoria"),                         ProbabilityRatio),
    (TopicInfo::new(82, "Probabilidad condicionada"),            ProbabilityRatio),
    (TopicInfo::new(83, "Distribuciones de probabilidad"),       ProbabilityRatio),
    (TopicInfo::new(84, "Estadística inferencial"),              ProbabilityRatio),
    (TopicInfo::new(85, "Regresión y correlación"),              ProbabilityRatio),
];

impl GenericTemplate {
    pub fn for_topic(topic_id: u32) -> GenericTemplate {
        GENERIC_TOPICS
            .iter()
            .find(|(info, _)| info.id == topic_id)
            .map(|(_, template)| *template)
            .unwrap_or(ProbabilityRatio)
    }

    pub fn generate(self, ctx: &mut GenerationContext<'_>) -> Result<Exercise> {
        match self {
            ComplementAngle     => complement_angle(ctx),
            PowerEvaluation     => power_evaluation(ctx),
            MatrixDeterminant   => matrix_determinant(ctx),
            PowerRuleDerivative => power_rule_derivative(ctx),
            ProbabilityRatio    => probability_ratio(ctx),
        }
    }
}

/// Entry point the registry stores for every topic in the block.
pub fn generate_generic(ctx: &mut GenerationContext<'_>) -> Result<Exercise> {
    GenericTemplate::for_topic(ctx.topic.id).generate(ctx)
}

const FALLBACK_RANGES: TierTable<Range> = TierTable::new((1, 20), (1, 50), (1, 100));

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

fn complement_angle(ctx: &mut GenerationContext<'_>) -> Result<Exercise> {
    let (min, max) = clamp_range(ctx.limits.range("numeros", &FALLBACK_RANGES), 10, 80);
    let angle = ctx.session.int(min, max);
    let correct = 90 - angle;

    let sampler = ctx
        .distractors(correct)
        .structural([correct + 5, correct - 5, 180 - angle])
        .valid(|v: &i64| *v > 0);
    let wrong = near_integers(ctx.session, correct, 10, sampler)?;

    let mut options = vec![correct];
    options.extend(wrong);

    ctx.choice(
        format!(
            "En un triángulo rectángulo, si un ángulo agudo mide {angle}°, ¿cuánto mide su complementario?"
        ),
        option_strings(&options),
        "En triángulos rectángulos, los ángulos agudos son complementarios y suman 90°.",
    )
}

fn power_evaluation(ctx: &mut GenerationContext<'_>) -> Result<Exercise> {
    let base = ctx.session.int(2, 5);
    let top = if ctx.tier == Tier::Avanzado { 6 } else { 4 };
    let exponent = ctx.session.int(2, top);
    let value = base.pow(exponent as u32);

    let sampler = ctx
        .distractors(value)
        .structural([value + base, value - base, base * exponent])
        .valid(|v: &i64| *v > 0);
    let wrong = near_integers(ctx.session, value, base, sampler)?;

    let mut options = vec![value];
    options.extend(wrong);

    ctx.choice(
        format!("Calcula {base}^{exponent}."),
        option_strings(&options),
        "Una potencia multiplica la base por sí misma tantas veces como indique el exponente.",
    )
}

fn matrix_determinant(ctx: &mut GenerationContext<'_>) -> Result<Exercise> {
    let (min, max) = ctx.limits.range("numeros", &FALLBACK_RANGES);
    let a = ctx.session.int(min, max);
    let b = ctx.session.int(min, max);
    let c = ctx.session.int(min, max);
    let d = ctx.session.int(min, max);
    let det = a * d - b * c;

    let sampler = ctx.distractors(det).structural([a * d + b * c, a + d, b - c]);
    let wrong = near_integers(ctx.session, det, 10, sampler)?;

    let mut options = vec![det];
    options.extend(wrong);

    ctx.choice(
        format!("Para la matriz 2x2 A = [[{a}, {b}], [{c}, {d}]], ¿cuál es det(A)?"),
        option_strings(&options),
        format!("Para matrices 2x2, det(A) = ad − bc = {a}·{d} − {b}·{c} = {det}."),
    )
}

/// `c`, `cx` or `cx^e`.
fn monomial(coef: i64, exp: i64) -> String {
    match exp {
        0 => format!("{coef}"),
        1 => format!("{coef}x"),
        _ => format!("{coef}x^{exp}"),
    }
}

fn power_rule_derivative(ctx: &mut GenerationContext<'_>) -> Result<Exercise> {
    let coef = ctx.session.int(2, 9);
    let top = if ctx.tier == Tier::Basico { 3 } else { 5 };
    let exp = ctx.session.int(2, top);
    let derivative = monomial(coef * exp, exp - 1);

    // Common misapplications of the power rule.
    let structural = [monomial(coef + exp, exp), monomial(coef, exp - 1), monomial(coef * exp, exp)];
    let wrong = ctx.distractors(derivative.clone()).structural(structural).synthesize(
        ctx.session,
        |s| monomial((coef * exp + s.int(-3, 3)).max(1), (exp - 1 + s.int(-1, 1)).max(0)),
        |step| monomial(coef * exp + step as i64 + 1, exp - 1),
    )?;

    let mut options = vec![derivative];
    options.extend(wrong);

    ctx.choice(
        format!("Deriva f(x) = {}.", monomial(coef, exp)),
        options,
        "Regla de la potencia: d/dx(ax^n) = a·n·x^(n−1).",
    )
}

fn probability_ratio(ctx: &mut GenerationContext<'_>) -> Result<Exercise> {
    let total = ctx.session.int(20, 100);
    let favourable = ctx.session.int(1, total - 1);
    let prob = favourable as f64 / total as f64;
    let correct = format_number(prob);

    let structural = [
        format_number(1.0 - prob),
        format_number(total as f64 / favourable as f64),
        format_number((favourable + total) as f64),
    ];
    let wrong = ctx
        .distractors(correct.clone())
        .structural(structural)
        .valid(|s: &String| s.parse::<f64>().map_or(false, |v| v > 0.0))
        .synthesize(
            ctx.session,
            |s| format_number(prob + s.int(-30, 30) as f64 / 100.0),
            |step| format_number(total as f64 + step as f64 + 1.0),
        )?;

    let mut options = vec![correct];
    options.extend(wrong);

    ctx.choice(
        format!("Si hay {favourable} casos favorables de {total} posibles, ¿cuál es la probabilidad?"),
        options,
        "Probabilidad clásica: casos favorables / casos posibles.",
    )
}
