use std::path::PathBuf;

use ndarray::array;
use policywalk_core::{BirlConfig, BirlMdp, Demonstration, DemonstrationSet, birl};
use policywalk_mdp::{compile_yaml, validate_demonstrations};

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("crates/policywalk-mdp/examples/gridworld.grid.yaml"));

    let mut expert = compile_yaml(&path).expect("failed to compile grid YAML");
    let truth = array![0.0, -1.0, 1.0, 0.0];
    expert.update_rewards(&truth);
    expert.update_policy(false);

    let starts = [expert.start(), expert.state_of(3, 3), expert.state_of(0, 0)];
    let traces = starts
        .iter()
        .map(|&start| expert.demonstrate(start))
        .collect();
    let list = starts
        .iter()
        .map(|&start| Demonstration::new(start, 0))
        .collect();
    let demos = DemonstrationSet::new(list, traces).expect("expert traces are non-empty");

    let config = BirlConfig {
        iterations: 200,
        burn_in: 50,
        sample_freq: 5,
        d_states: expert.num_features(),
        ..BirlConfig::from_default_yaml().expect("default config should parse")
    };

    let mut mdps = vec![compile_yaml(&path).expect("failed to compile grid YAML")];
    validate_demonstrations(&mdps, &demos).expect("expert traces stay on the grid");
    let report = birl(&mut mdps, &config, &demos, &demos, Some(&truth)).expect("BIRL run failed");

    println!(
        "samples={} accepted={} suboptimal={}",
        report.samples.len(),
        report.accepted_count,
        report.suboptimal_count
    );
    println!("sor_mean={:.6} sor_std={:.6}", report.sor.mean, report.sor.std);
    println!("beta_mean={:.3} beta_std={:.3}", report.beta.mean, report.beta.std);
    if let Some(sor) = report.ground_truth_sor {
        println!("ground_truth_sor={sor:.6}");
    }
}
