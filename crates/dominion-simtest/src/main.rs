//! OpenDominion Ops Harness
//!
//! Sweeps the ops calculators over synthetic ranges and a scenario file,
//! checking the invariants the game relies on. Runs entirely
//! in-process: no database, no web layer.
//!
//! Usage:
//!   cargo run -p dominion-simtest
//!   cargo run -p dominion-simtest -- --verbose --seed 7 --config balance.json
//!
//! Set `RUST_LOG=dominion_logic=debug` to see individual rolls.

use anyhow::Context;
use clap::Parser;
use dominion_logic::config::OpsConfig;
use dominion_logic::dominion::{Discipline, DominionState, OpsContext, SpellKind, SpyOpKind};
use dominion_logic::improvements::{improvement_total, ImprovementType};
use dominion_logic::ops;
use dominion_logic::resolve::{self, SpellCasters};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Scenario data ───────────────────────────────────────────────────────
const SCENARIOS_JSON: &str = include_str!("../../../data/scenarios.json");

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    context: OpsContext,
    spies_sent: u64,
    casters: SpellCasters,
    attacker: DominionState,
    target: DominionState,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Parser)]
#[command(name = "dominion-simtest", about = "Sweep the ops formulas and report invariant checks")]
struct Args {
    /// Print every check, not only failures
    #[arg(short, long)]
    verbose: bool,

    /// Seed for the rolled-outcome checks
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// JSON file overriding the default ops balance
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<OpsConfig> {
    let Some(path) = path else {
        return Ok(OpsConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config = OpsConfig::from_json(&json)
        .with_context(|| format!("parsing {}", path.display()))?;
    log::info!("loaded ops config from {}", path.display());
    Ok(config)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("failed to load ops config: {:#}", e);
            std::process::exit(2);
        }
    };

    println!("=== OpenDominion Ops Harness ===\n");

    let mut results = Vec::new();

    // 1. Scenario file validation
    let scenarios = match serde_json::from_str::<Vec<Scenario>>(SCENARIOS_JSON) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult {
                name: "scenarios_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            Vec::new()
        }
    };
    results.extend(validate_scenarios(&scenarios, args.verbose));

    // 2. Success-chance curves
    results.extend(validate_success_curves(&config, args.verbose));

    // 3. Casualties
    results.extend(validate_casualties(&scenarios, &config, args.verbose));

    // 4. Resilience & mastery
    results.extend(validate_progression(&config, args.verbose));

    // 5. Damage reduction & spell vulnerability
    results.extend(validate_vulnerability(&scenarios, &config, args.verbose));

    // 6. Rolled outcomes
    results.extend(validate_resolution(&scenarios, &config, args.seed, args.verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Scenarios ────────────────────────────────────────────────────────

fn validate_scenarios(scenarios: &[Scenario], verbose: bool) -> Vec<TestResult> {
    println!("--- Scenarios ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "scenarios_not_empty".into(),
        passed: !scenarios.is_empty(),
        detail: format!("{} scenarios loaded", scenarios.len()),
    });

    let landless: Vec<_> = scenarios
        .iter()
        .filter(|s| s.attacker.total_land() == 0 || s.target.total_land() == 0)
        .map(|s| s.name.as_str())
        .collect();
    results.push(TestResult {
        name: "scenarios_have_land".into(),
        passed: landless.is_empty(),
        detail: if landless.is_empty() {
            "every dominion holds land".into()
        } else {
            format!("landless dominions in: {}", landless.join(", "))
        },
    });

    let over_invested: Vec<_> = scenarios
        .iter()
        .filter(|s| {
            s.target.stat_total_investment > 0
                && improvement_total(&s.target.improvements) > s.target.stat_total_investment
        })
        .map(|s| s.name.as_str())
        .collect();
    results.push(TestResult {
        name: "scenarios_investment_consistent".into(),
        passed: over_invested.is_empty(),
        detail: if over_invested.is_empty() {
            "current improvements never exceed lifetime investment".into()
        } else {
            format!("improvements above investment in: {}", over_invested.join(", "))
        },
    });

    if verbose {
        for s in scenarios {
            println!(
                "    {:24} day {:2} war={} land {} vs {}",
                s.name,
                s.context.day_in_round,
                s.context.mutual_war,
                s.attacker.total_land(),
                s.target.total_land()
            );
        }
    }

    results
}

// ── 2. Success Curves ───────────────────────────────────────────────────

fn validate_success_curves(config: &OpsConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Success Chances ---");
    let mut results = Vec::new();

    let ratios: Vec<f64> = (1..=60).map(|i| i as f64 * 0.05).collect();
    type Curve = fn(f64, f64, f64, f64, &OpsConfig) -> f64;
    let curves: [(&str, Curve, f64); 3] = [
        ("info", ops::info_operation_success_chance, 0.98),
        ("theft", ops::theft_operation_success_chance, 0.97),
        ("black", ops::black_operation_success_chance, 0.97),
    ];

    for (name, curve, _) in &curves {
        let chances: Vec<f64> = ratios
            .iter()
            .map(|&r| curve(r, 1.0, 100.0, 100.0, config))
            .collect();
        let monotonic = chances.windows(2).all(|w| w[1] >= w[0]);
        results.push(TestResult {
            name: format!("success_{}_monotonic", name),
            passed: monotonic,
            detail: format!(
                "ratio 0.05→3.0 gives {:.3}→{:.3}",
                chances[0],
                chances[chances.len() - 1]
            ),
        });

        let bounded = chances.iter().all(|&c| c >= 0.01 && c <= 1.0);
        results.push(TestResult {
            name: format!("success_{}_bounded", name),
            passed: bounded,
            detail: "all chances within [0.01, 1.0]".into(),
        });

        let undefended = curve(0.01, 0.0, 0.0, 100.0, config);
        results.push(TestResult {
            name: format!("success_{}_undefended", name),
            passed: (undefended - 1.0).abs() < 1e-12,
            detail: format!("zero defense → {:.2}", undefended),
        });
    }

    if config == &OpsConfig::default() {
        for (name, curve, cap) in &curves {
            let top = curve(100.0, 0.01, 100.0, 0.0, config);
            results.push(TestResult {
                name: format!("success_{}_cap", name),
                passed: (top - cap).abs() < 1e-12,
                detail: format!("overwhelming ratio capped at {:.2}", top),
            });
        }
    }

    if verbose {
        println!("  ratio   info  theft  black");
        for r in [0.25, 0.5, 1.0, 1.5, 2.0] {
            println!(
                "  {:5.2}  {:5.3}  {:5.3}  {:5.3}",
                r,
                ops::info_operation_success_chance(r, 1.0, 100.0, 100.0, config),
                ops::theft_operation_success_chance(r, 1.0, 100.0, 100.0, config),
                ops::black_operation_success_chance(r, 1.0, 100.0, 100.0, config),
            );
        }
    }

    results
}

// ── 3. Casualties ───────────────────────────────────────────────────────

fn validate_casualties(
    scenarios: &[Scenario],
    config: &OpsConfig,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Casualties ---");
    let mut results = Vec::new();

    let max_band = config
        .info_spy_casualties
        .max
        .max(config.theft_spy_casualties.max)
        .max(config.black_spy_casualties.max)
        / 100.0;

    for s in scenarios {
        let mut worst = 0.0f64;
        for kind in [SpyOpKind::Info, SpyOpKind::Theft, SpyOpKind::Black] {
            let losses = ops::spy_losses(&s.attacker, &s.target, kind, &s.context, config);
            worst = worst.max(losses);
            if verbose {
                println!("    {:24} {:?} spies lost {:.4}%", s.name, kind, losses * 100.0);
            }
        }
        results.push(TestResult {
            name: format!("casualties_{}_spy_bounded", s.name),
            passed: worst > 0.0 && worst <= max_band,
            detail: format!(
                "worst spy loss {:.4}% (band max {:.2}%)",
                worst * 100.0,
                max_band * 100.0
            ),
        });

        let wizards =
            ops::wizard_losses(&s.attacker, &s.target, SpellKind::Hostile, &s.context, config);
        let archmages =
            ops::archmage_losses(&s.attacker, &s.target, SpellKind::Hostile, &s.context, config);
        let info = ops::wizard_losses(&s.attacker, &s.target, SpellKind::Info, &s.context, config);
        results.push(TestResult {
            name: format!("casualties_{}_wizards", s.name),
            passed: wizards > 0.0
                && (archmages * config.archmage_loss_divisor - wizards).abs() < 1e-12
                && info == 0.0,
            detail: format!(
                "hostile wizards {:.4}%, archmages {:.4}%, info spells free",
                wizards * 100.0,
                archmages * 100.0
            ),
        });

        let peace = OpsContext {
            mutual_war: false,
            ..s.context
        };
        let war = OpsContext {
            mutual_war: true,
            ..s.context
        };
        let at_peace =
            ops::wizard_losses(&s.attacker, &s.target, SpellKind::Hostile, &peace, config);
        let at_war = ops::wizard_losses(&s.attacker, &s.target, SpellKind::Hostile, &war, config);
        results.push(TestResult {
            name: format!("casualties_{}_war_discount", s.name),
            passed: at_war < at_peace,
            detail: format!("{:.4}% at peace → {:.4}% at war", at_peace * 100.0, at_war * 100.0),
        });
    }

    results
}

// ── 4. Resilience & Mastery ─────────────────────────────────────────────

fn validate_progression(config: &OpsConfig, _verbose: bool) -> Vec<TestResult> {
    println!("--- Resilience & Mastery ---");
    let mut results = Vec::new();
    let max = config.resilience.max;

    for discipline in [Discipline::Spy, Discipline::Wizard] {
        let mut d = DominionState::default();
        let mut hits = 0;
        while hits < 10_000 {
            let gain = ops::resilience_gain(&d, discipline, config);
            if gain == 0 {
                break;
            }
            match discipline {
                Discipline::Spy => d.spy_resilience += gain,
                Discipline::Wizard => d.wizard_resilience += gain,
            }
            hits += 1;
        }
        results.push(TestResult {
            name: format!("resilience_{:?}_saturates", discipline).to_lowercase(),
            passed: d.resilience(discipline) == max,
            detail: format!("reached {} after {} ops", d.resilience(discipline), hits),
        });

        let mut hours = 0;
        while d.resilience(discipline) > 0 && hours < 10_000 {
            let decay = ops::resilience_decay(&d, discipline, config);
            match discipline {
                Discipline::Spy => d.spy_resilience += decay,
                Discipline::Wizard => d.wizard_resilience += decay,
            }
            hours += 1;
        }
        results.push(TestResult {
            name: format!("resilience_{:?}_decays_to_zero", discipline).to_lowercase(),
            passed: d.resilience(discipline) == 0,
            detail: format!("fully decayed after {} hours", hours),
        });
    }

    // Mastery gain never negative and non-decreasing in the gap
    let me = DominionState::default();
    let gains: Vec<i32> = (-1000..=1000)
        .step_by(25)
        .map(|gap| {
            let target = DominionState {
                spy_mastery: gap,
                ..Default::default()
            };
            ops::mastery_change(&me, &target, Discipline::Spy, config)
        })
        .collect();
    results.push(TestResult {
        name: "mastery_monotonic".into(),
        passed: gains.windows(2).all(|w| w[1] >= w[0]) && gains.iter().all(|&g| g >= 0),
        detail: format!(
            "gap -1000→1000 gives {}→{}",
            gains[0],
            gains[gains.len() - 1]
        ),
    });

    results
}

// ── 5. Vulnerability ────────────────────────────────────────────────────

fn validate_vulnerability(
    scenarios: &[Scenario],
    config: &OpsConfig,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Damage Reduction & Vulnerability ---");
    let mut results = Vec::new();

    for s in scenarios {
        let t = &s.target;
        let ctx = &s.context;

        let spy_dr = ops::damage_reduction(t, Discipline::Spy, ctx, config);
        let wiz_dr = ops::damage_reduction(t, Discipline::Wizard, ctx, config);
        results.push(TestResult {
            name: format!("vulnerability_{}_dr_capped", s.name),
            passed: (0.0..=config.damage_reduction.max).contains(&spy_dr)
                && (0.0..=config.damage_reduction.max).contains(&wiz_dr),
            detail: format!("spy {:.3}, wizard {:.3}", spy_dr, wiz_dr),
        });

        let protected = ops::peasants_protected(t, ctx, config);
        let vulnerable = ops::peasants_vulnerable(t, ctx, config);
        let unprotected = ops::peasants_unprotected(t, ctx, config);
        results.push(TestResult {
            name: format!("vulnerability_{}_peasants", s.name),
            passed: protected + vulnerable == t.max_peasant_population.max(0)
                && unprotected <= t.peasants.max(0),
            detail: format!(
                "protected {} / vulnerable {} / exposed now {}",
                protected, vulnerable, unprotected
            ),
        });

        let total = ops::improvements_vulnerable(t, None, ctx, config);
        let shares: i64 = ImprovementType::ALL
            .iter()
            .filter(|imp| imp.is_destroyable())
            .map(|&imp| ops::improvements_vulnerable(t, Some(imp), ctx, config))
            .sum();
        results.push(TestResult {
            name: format!("vulnerability_{}_improvement_shares", s.name),
            passed: (total - shares).abs() <= ImprovementType::ALL.len() as i64,
            detail: format!("total {} vs per-type sum {}", total, shares),
        });

        if verbose {
            println!(
                "    {:24} spires {:.4} modifier {:.3} lightning-exposed {}",
                s.name,
                ops::spires_protection(t, config),
                ops::spell_vulnerability_protection_modifier(t, ctx, config),
                ops::improvements_unprotected(t, None, ctx, config)
            );
        }
    }

    results
}

// ── 6. Resolution ───────────────────────────────────────────────────────

fn validate_resolution(
    scenarios: &[Scenario],
    config: &OpsConfig,
    seed: u64,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Rolled Outcomes (seed {}) ---", seed);
    let mut results = Vec::new();
    let trials = 5_000;

    for s in scenarios {
        let mut rng = StdRng::seed_from_u64(seed);
        let chance = ops::spy_op_success_chance(&s.attacker, &s.target, SpyOpKind::Black, config);
        let mut successes = 0;
        let mut spies_lost = 0u64;
        for _ in 0..trials {
            let outcome = resolve::resolve_spy_op(
                &s.attacker,
                &s.target,
                SpyOpKind::Black,
                s.spies_sent,
                &s.context,
                config,
                &mut rng,
            );
            if outcome.success {
                successes += 1;
            }
            spies_lost = spies_lost.max(outcome.units_lost);
        }
        let observed = successes as f64 / trials as f64;
        results.push(TestResult {
            name: format!("resolve_{}_black_rate", s.name),
            passed: (observed - chance).abs() < 0.03,
            detail: format!("chance {:.3}, observed {:.3} over {} rolls", chance, observed, trials),
        });
        results.push(TestResult {
            name: format!("resolve_{}_losses_bounded", s.name),
            passed: spies_lost <= s.spies_sent,
            detail: format!("worst single failure cost {} of {} spies", spies_lost, s.spies_sent),
        });

        let spell = resolve::resolve_spell(
            &s.attacker,
            &s.target,
            SpellKind::Hostile,
            s.casters,
            &s.context,
            config,
            &mut rng,
        );
        let resilience_ok = s.target.wizard_resilience + spell.target_resilience_gained
            <= config.resilience.max;
        results.push(TestResult {
            name: format!("resolve_{}_spell_resilience", s.name),
            passed: resilience_ok,
            detail: format!(
                "success={} resilience +{} mastery +{}",
                spell.success, spell.target_resilience_gained, spell.mastery_gained
            ),
        });

        if verbose {
            println!(
                "    {:24} black chance {:.3} observed {:.3}",
                s.name, chance, observed
            );
        }
    }

    results
}
