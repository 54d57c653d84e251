use std::fmt;

use crate::exercise_engine::{
    builder::{option_strings, TopicInfo},
    context::GenerationContext,
    difficulty::Tier,
    error::Result,
    models::Exercise,
    numeric::simplify_fraction,
};

pub const SIMPLE_PROBABILITY: TopicInfo = TopicInfo::new(14, "Probabilidad simple");

/// A fraction kept in lowest terms, so string equality is value equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fraction {
    num: i64,
    den: i64,
}

impl Fraction {
    fn new(num: i64, den: i64) -> Self {
        let (num, den) = simplify_fraction(num, den.max(1));
        Fraction { num, den }
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[derive(Debug, Clone, Copy)]
enum Experiment {
    Die,
    Coin,
    Bag,
}

const EXPERIMENTS: [Experiment; 3] = [Experiment::Die, Experiment::Coin, Experiment::Bag];

// (event, favourable faces out of 6)
const DIE_EVENTS: [(&str, i64); 4] = [
    ("salir un número par", 3),
    ("salir un número mayor que 4", 2),
    ("salir un número menor o igual que 2", 2),
    ("salir exactamente el número 3", 1),
];

const COIN_EVENTS: [&str; 4] = ["salga cara", "salga cruz", "no salga cruz", "no salga cara"];

const BAG_COLOURS: [&str; 3] = ["roja", "azul", "verde"];

struct Draw {
    statement: String,
    favourable: i64,
    total: i64,
}

fn draw_die(ctx: &mut GenerationContext<'_>) -> Draw {
    let (event, favourable) = *ctx.session.pick(&DIE_EVENTS);
    Draw {
        statement: format!(
            "Se lanza un dado cúbico equilibrado. ¿Cuál es la probabilidad de {event}?"
        ),
        favourable,
        total: 6,
    }
}

fn draw_coin(ctx: &mut GenerationContext<'_>) -> Draw {
    let event = *ctx.session.pick(&COIN_EVENTS);
    Draw {
        statement: format!("Se lanza una moneda equilibrada. ¿Cuál es la probabilidad de que {event}?"),
        favourable: 1,
        total: 2,
    }
}

fn draw_bag(ctx: &mut GenerationContext<'_>) -> Draw {
    let most = if ctx.tier == Tier::Basico { 3 } else { 5 };
    let red = ctx.session.int(1, most);
    let blue = ctx.session.int(1, most);
    let green = if ctx.tier == Tier::Avanzado { ctx.session.int(1, 4) } else { ctx.session.int(0, 2) };

    // A colour with no balls would make the answer 0; ask about red instead.
    let colour = match *ctx.session.pick(&BAG_COLOURS) {
        "verde" if green == 0 => "roja",
        c => c,
    };
    let favourable = match colour {
        "roja" => red,
        "azul" => blue,
        _      => green,
    };
    Draw {
        statement: format!(
            "En una bolsa hay {red} bolas rojas, {blue} azules y {green} verdes. \
             Se extrae una bola al azar. ¿Cuál es la probabilidad de sacar una bola {colour}?"
        ),
        favourable,
        total: red + blue + green,
    }
}

pub fn generate_simple_probability(ctx: &mut GenerationContext<'_>) -> Result<Exercise> {
    let draw = match *ctx.session.pick(&EXPERIMENTS) {
        Experiment::Die  => draw_die(ctx),
        Experiment::Coin => draw_coin(ctx),
        Experiment::Bag  => draw_bag(ctx),
    };
    let Draw { statement, favourable, total } = draw;
    let correct = Fraction::new(favourable, total);

    // Complement first; the rest are ratio mix-ups.
    let structural = [
        Fraction::new(total - favourable, total),
        Fraction::new(total, favourable),
        Fraction::new(favourable, (total - favourable).max(1)),
    ];
    let wrong = ctx
        .distractors(correct)
        .structural(structural)
        .valid(|f: &Fraction| f.num > 0)
        .synthesize(
            ctx.session,
            |s| Fraction::new(s.int(1, total), total),
            |step| Fraction::new(1, total + step as i64 + 1),
        )?;

    let mut options = vec![correct];
    options.extend(wrong);

    ctx.choice(
        statement,
        option_strings(&options),
        format!(
            "La probabilidad clásica es casos favorables entre casos posibles: \
             P = {favourable}/{total} = {correct}."
        ),
    )
}
