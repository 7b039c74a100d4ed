use interpreter::run::{run, run_debug};
use test_data::TEST_DATA;

fn print_readable_error(name: &str, input: &[String], output: &str, expected: &str) -> ! {
    let lines = output.lines().map(Some).chain(std::iter::repeat(None));
    let expected_lines = expected.lines().map(Some).chain(std::iter::repeat(None));
    let len = output.lines().count().max(expected.lines().count());

    let readable_message: String = lines.zip(expected_lines)
        .take(len)
        .map(|(out, exp)| format!("{:>12} <=> {}\n", out.unwrap_or("None"), exp.unwrap_or("None")))
        .collect();

    panic!("assertion failed for {} with input {:?}: `(output == expected)`:\n{}", name, input, readable_message);
}

fn check_success(name: &str) {
    let data = &TEST_DATA[name];
    let tree = match parser::parse_program(data.text) {
        Ok(tree) => tree,
        Err(errors) => panic!("{} failed to analyse: {:?}", name, errors),
    };

    for (input, expected) in &data.valid_io {
        let output = match run(tree.clone(), input.clone()) {
            Ok(output) => output,
            Err(error) => {
                let (_, logs) = run_debug(tree.clone(), input.clone());
                println!("{}", logs.join("\n"));
                panic!("{} crashed with input {:?}: {}", name, input, error);
            },
        };

        if &output != expected {
            print_readable_error(name, input, &output, expected);
        }
    }
}

#[test]
fn every_program_is_analysed() {
    for (name, data) in TEST_DATA.iter() {
        assert!(parser::parse_program(data.text).is_ok(), "{}", name);
    }
}

#[test]
fn gcd() {
    check_success("gcd");
}

#[test]
fn lcm() {
    check_success("lcm");
}

#[test]
fn factorial() {
    check_success("factorial");
}

#[test]
fn fib() {
    check_success("fib");
}

#[test]
fn bitstring() {
    check_success("bitstring");
}

#[test]
fn numbers() {
    check_success("numbers");
}

#[test]
fn prime_decomposition() {
    check_success("prime_decomposition");
}

#[test]
fn div_mod() {
    check_success("div_mod");
}

#[test]
fn collatz() {
    check_success("collatz");
}

#[test]
fn average() {
    check_success("average");
}

#[test]
fn sin_table() {
    check_success("sin_table");
}

#[test]
fn triangle() {
    check_success("triangle");
}
