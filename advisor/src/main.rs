use advisor::{build_provider, DecisionProvider, LlmConfig, LocalProvider};
use arena_core::{GameSnapshot, ValidationErrors};
use std::env;
use std::fs;
use std::sync::Arc;
use std::time::Instant;

// Snapshots are tiny; anything larger is not a snapshot
const MAX_SNAPSHOT_SIZE: u64 = 64 * 1024;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "decide" | "fallback" => {
            if args.len() < 3 {
                eprintln!("Usage: {} {} <snapshot_file>", args[0], command);
                std::process::exit(1);
            }

            let snapshot = load_snapshot(&args[2]);
            let provider: Arc<dyn DecisionProvider> = if command == "fallback" {
                Arc::new(LocalProvider)
            } else {
                build_provider(&LlmConfig::from_env())
            };

            decide_command(provider.as_ref(), &snapshot).await;
        }

        "--help" | "-h" => {
            print_usage(&args[0]);
            std::process::exit(0);
        }

        _ => {
            eprintln!("❌ Unknown command: {}", command);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> <snapshot_file>", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  decide <snapshot_file>");
    eprintln!("      Ask the configured model for the AI's next move");
    eprintln!("      Falls back to the local heuristic when OPENAI_API_KEY is unset");
    eprintln!("      or the model call fails");
    eprintln!();
    eprintln!("  fallback <snapshot_file>");
    eprintln!("      Run the local heuristic only, no network access");
    eprintln!();
    eprintln!("Snapshot file (JSON):");
    eprintln!("  {{\"player_score\": 2, \"ai_score\": 1, \"rally_length\": 5,");
    eprintln!("   \"player_hit_pattern\": \"mixed\", \"ball_speed\": 6.5, \"difficulty\": \"medium\"}}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  OPENAI_API_KEY      credential (optional)");
    eprintln!("  OPENAI_MODEL        model name (default: {})", advisor::DEFAULT_MODEL);
    eprintln!("  OPENAI_BASE_URL     API root (default: {})", advisor::DEFAULT_BASE_URL);
    eprintln!("  PONG_AI_TIMEOUT_MS  per-call timeout (default: {})", advisor::DEFAULT_TIMEOUT_MS);
}

fn load_snapshot(path: &str) -> GameSnapshot {
    let metadata = fs::metadata(path).unwrap_or_else(|e| {
        eprintln!("❌ Error accessing file '{}': {}", path, e);
        std::process::exit(1);
    });

    if metadata.len() > MAX_SNAPSHOT_SIZE {
        eprintln!(
            "❌ Snapshot file too large: {} bytes (max {} bytes)",
            metadata.len(),
            MAX_SNAPSHOT_SIZE
        );
        std::process::exit(1);
    }

    let raw = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("❌ Error reading file '{}': {}", path, e);
        std::process::exit(1);
    });

    parse_snapshot(&raw).unwrap_or_else(|e| {
        eprintln!("❌ Invalid snapshot:");
        match e {
            SnapshotError::Json(e) => eprintln!("   {}", e),
            SnapshotError::Invalid(errors) => {
                for v in errors.violations() {
                    eprintln!("   - {}: {}", v.field, v.constraint);
                }
            }
        }
        std::process::exit(1);
    })
}

enum SnapshotError {
    Json(serde_json::Error),
    Invalid(ValidationErrors),
}

fn parse_snapshot(raw: &str) -> Result<GameSnapshot, SnapshotError> {
    let payload: arena_core::SnapshotPayload =
        serde_json::from_str(raw).map_err(SnapshotError::Json)?;
    GameSnapshot::try_from(payload).map_err(SnapshotError::Invalid)
}

async fn decide_command(provider: &dyn DecisionProvider, snapshot: &GameSnapshot) {
    eprintln!("🏓 Deciding AI move ({} provider)", provider.name());
    eprintln!(
        "  Score: player {} - ai {}, rally {}, ball speed {}, difficulty {}",
        snapshot.player_score(),
        snapshot.ai_score(),
        snapshot.rally_length(),
        snapshot.ball_speed(),
        snapshot.difficulty()
    );

    let start = Instant::now();
    let response = provider.decide(snapshot).await;
    eprintln!("  Decision time: {:.2}s", start.elapsed().as_secs_f64());

    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("❌ Error encoding response: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{Difficulty, HitPattern};

    #[test]
    fn parses_valid_snapshot() {
        let snapshot = parse_snapshot(
            r#"{"player_score":3,"ai_score":1,"rally_length":5,
                "player_hit_pattern":"downward","ball_speed":6.0}"#,
        )
        .unwrap_or_else(|_| panic!("snapshot should parse"));
        assert_eq!(snapshot.player_hit_pattern(), HitPattern::Downward);
        assert_eq!(snapshot.difficulty(), Difficulty::Medium);
    }

    #[test]
    fn reports_every_violation() {
        let result = parse_snapshot(
            r#"{"player_score":-1,"ai_score":0,"rally_length":0,
                "player_hit_pattern":"sideways","ball_speed":0}"#,
        );
        match result {
            Err(SnapshotError::Invalid(errors)) => {
                assert!(errors.has_field("player_score"));
                assert!(errors.has_field("player_hit_pattern"));
                assert!(errors.has_field("ball_speed"));
            }
            _ => panic!("expected validation errors"),
        }
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse_snapshot("{not json"), Err(SnapshotError::Json(_))));
    }
}
