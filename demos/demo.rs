//! End-to-end tour of the exercise engine.
//!
//! Run with: `cargo run --example demo`
//!
//! 1. **Every topic** at intermedio with a fixed seed, so the output is
//!    reproducible.
//! 2. **Both taxonomies**: the same seed at `media` and `intermedio` yields the
//!    same exercise, since both normalize to one tier.
//! 3. **Catalog limits**: an in-memory catalog narrows topic 1 to
//!    multiplication of numbers between 100 and 110.
//! 4. **Fill-in and payloads**: a choice exercise converted to fill-in form,
//!    and the question/correction split a client receives.
//!
//! `LOG_LEVEL` sets the tracing filter (e.g. `LOG_LEVEL=debug`).
//! `EXERCISE_ENGINE_CONFIG` may name a TOML file with engine settings.

use std::sync::Arc;

use exercise_drill_gen::{
    CasualDifficulty, CoreDifficulty, EngineConfig, Exercise, ExerciseConfig, ExerciseEngine,
    GenerationRequest, MemoryCatalog, QuestionPayload, Registry,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("warn,exercise_drill_gen=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn print_exercise(ex: &Exercise) {
    let meta = ex.meta();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  [{:02} {}]  {}  ID: {}", meta.topic_id, meta.topic_title, meta.difficulty, meta.id);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Q: {}", ex.statement());
    match ex {
        Exercise::Choice(choice) => {
            for (i, option) in choice.options.iter().enumerate() {
                let marker = if i == choice.correct_index { "✓" } else { " " };
                println!("  [{i}] {marker} {option}");
            }
        }
        Exercise::FillIn(fill) => {
            println!("  {}", fill.fill_text);
            println!("  answer: {}", fill.correct_answer);
        }
    }
    if let Some(explanation) = ex.explanation() {
        println!("  → {explanation}");
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let catalog = Arc::new(MemoryCatalog::new().with_topics(["01_operaciones_basicas"]));
    catalog.insert(
        "01_operaciones_basicas",
        json!({ "porDificultad": { "intermedio": {
            "rangos": { "numeros": [100, 110] },
            "operacionesPermitidas": ["×"]
        } } }),
    );
    let engine = ExerciseEngine::new(
        Registry::standard(),
        exercise_drill_gen::CatalogCache::new(catalog),
        EngineConfig::load_from_env()?,
    );

    // ── Every topic ────────────────────────────────────────────────────────
    println!();
    println!("══ All topics ══");
    println!();
    let topics: Vec<u32> = engine.registry().topic_ids().collect();
    for (i, topic) in topics.into_iter().enumerate() {
        let request = GenerationRequest::new(topic)
            .difficulty(CoreDifficulty::Intermedio)
            .seed(1000 + i as u64);
        print_exercise(&engine.generate(request)?);
    }

    // ── Both taxonomies ────────────────────────────────────────────────────
    println!("══ media vs intermedio (seed 42) ══");
    println!();
    let casual = engine.generate(GenerationRequest::new(10).difficulty(CasualDifficulty::Media).seed(42))?;
    let core = engine.generate(GenerationRequest::new(10).difficulty(CoreDifficulty::Intermedio).seed(42))?;
    println!("  media:      {}", casual.statement());
    println!("  intermedio: {}", core.statement());
    println!();

    // ── Catalog limits ─────────────────────────────────────────────────────
    println!("══ Topic 1 with catalog limits ══");
    println!();
    let request = GenerationRequest::new(1).difficulty(CoreDifficulty::Intermedio).seed(7);
    print_exercise(&engine.generate(request.clone())?);
    print_exercise(&engine.generate_fresh(request).await?);

    // ── Fill-in and payloads ───────────────────────────────────────────────
    println!("══ Fill-in and client payload ══");
    println!();
    let fill = engine.generate(
        GenerationRequest::new(8).seed(3).config(ExerciseConfig::completar()),
    )?;
    print_exercise(&fill);

    let choice = engine.generate(GenerationRequest::new(14).seed(3))?;
    let payload = QuestionPayload::from(&choice);
    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}
