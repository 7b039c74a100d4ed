use easybench::bench;
use rand::prelude::*;

use interpreter::run::run;
use parser::{parse_program, tokenize, AnalysisMachine};

fn countdown(limit: i64) -> String {
    format!(
        "program countdown; var n: int; begin n := {}; while n > 0 do n := n - 1; Write(n) end.",
        limit,
    )
}

fn analyse(text: &str) -> usize {
    let tokens = tokenize(text).expect("lexing failed");
    let mut machine = AnalysisMachine::new();
    machine.analyze(&tokens);
    machine.finish().map(|tree| tree.len()).unwrap_or(0)
}

fn main() {
    let mut rng = thread_rng();

    let mut names: Vec<_> = test_data::TEST_DATA.keys().collect();
    names.sort();

    for name in names {
        let data = &test_data::TEST_DATA[name];
        let tree = parse_program(data.text).expect("sample program is invalid");
        let (input, _) = data.valid_io.choose(&mut rng).expect("no inputs");

        println!("{} analysis: {}", name, bench(|| analyse(data.text)));
        println!("{} execution: {}", name, bench(|| run(tree.clone(), input.clone())));
    }

    let limit = rng.gen_range(100, 1000);
    let tree = parse_program(&countdown(limit)).expect("countdown is invalid");
    println!("countdown({}): {}", limit, bench(|| run(tree.clone(), Vec::<String>::new())));
}
