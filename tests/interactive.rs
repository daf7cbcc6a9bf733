use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use twocaptcha_rs::{CaptchaSolver, RecaptchaV2Task, VERSION};
use url::Url;

fn prompt(label: &str) -> io::Result<String> {
    print!("{} ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn parse_secs(input: &str, default: u64) -> u64 {
    input.trim().parse().ok().filter(|value| *value > 0).unwrap_or(default)
}

#[test]
#[ignore = "Requires network access, a funded API key, and manual input"]
fn interactive_full_stack() -> Result<(), Box<dyn Error>> {
    println!("twocaptcha-rs {} interactive smoke test", VERSION);
    println!("Provide inputs when prompted. Press Enter to accept defaults.\n");

    let api_key = prompt("API key:")?;
    if api_key.is_empty() {
        return Err("an API key is required".into());
    }

    let page_input = prompt("Demo page URL [https://2captcha.com/demo/recaptcha-v2]:")?;
    let page_url = if page_input.is_empty() {
        "https://2captcha.com/demo/recaptcha-v2".to_string()
    } else {
        page_input
    };
    let site_key_input = prompt("Site key [6LfD3PIbAAAAAJs_eEHvoOl75_83eXSqpPSRFJ_u]:")?;
    let site_key = if site_key_input.is_empty() {
        "6LfD3PIbAAAAAJs_eEHvoOl75_83eXSqpPSRFJ_u".to_string()
    } else {
        site_key_input
    };

    let interval_answer = prompt("Poll interval seconds [15]:")?;
    let timeout_answer = prompt("Solve timeout seconds [120]:")?;
    let cost_answer = prompt("Report solving cost? (y/N):")?;

    let solver = CaptchaSolver::builder(api_key)
        .with_poll_interval(Duration::from_secs(parse_secs(&interval_answer, 15)))
        .with_solve_timeout(Duration::from_secs(parse_secs(&timeout_answer, 120)))
        .with_cost_aware(matches!(
            cost_answer.to_ascii_lowercase().as_str(),
            "y" | "yes" | "true"
        ))
        .with_event_handler(Arc::new(PrintingHandler))
        .build()?;

    let runtime = Runtime::new()?;

    let balance = runtime.block_on(solver.client().balance())?;
    println!("Account balance: {balance}");

    let load = runtime.block_on(
        solver
            .client()
            .load_stats(&["waiting", "load", "minbid", "averageRecognitionTime"]),
    )?;
    for (name, value) in &load {
        println!("Load stat {name}: {value}");
    }

    let whitelisted = runtime.block_on(solver.client().list_pingbacks())?;
    println!("Pingback whitelist ({} entries)", whitelisted.len());

    println!("\nSubmitting reCAPTCHA v2 on {page_url}...");
    let task = RecaptchaV2Task::new(site_key, Url::parse(&page_url)?).into();
    let solution = runtime.block_on(solver.solve(&task))?;
    println!("Token ({} chars): {}...", solution.text.len(), &solution.text[..solution.text.len().min(40)]);
    if let Some(cost) = solution.cost {
        println!("Cost: {cost}");
    }

    println!("Interactive test complete. Re-run with different inputs as needed.");
    Ok(())
}

struct PrintingHandler;

impl twocaptcha_rs::EventHandler for PrintingHandler {
    fn handle(&self, event: &twocaptcha_rs::SolverEvent) {
        match event {
            twocaptcha_rs::SolverEvent::Submitted(submitted) => {
                println!("-> job {} accepted", submitted.job);
            }
            twocaptcha_rs::SolverEvent::Poll(poll) => {
                println!("   poll #{} for job {}", poll.attempt, poll.job);
            }
            twocaptcha_rs::SolverEvent::Solved(solved) => {
                println!("<- job {} solved in {:.1}s", solved.job, solved.elapsed.as_secs_f64());
            }
            twocaptcha_rs::SolverEvent::Failed(failed) => {
                println!("<- failed: {}", failed.error);
            }
        }
    }
}
