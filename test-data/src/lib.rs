use std::collections::HashMap;

use lazy_static::lazy_static;
use rand::distributions::Uniform;
use rand::prelude::*;

/// A sample program with the inputs it is fed and the output it must
/// produce for them. Inputs are delivered one per `Read`.
pub struct ProgramData {
    pub text: &'static str,
    pub valid_io: Vec<(Vec<String>, String)>,
}

mod data;

lazy_static! {
    pub static ref TEST_DATA: HashMap<String, ProgramData> = get_all_programs();
}

fn generate_program_data(data: data::Data, inputs: Vec<Vec<i64>>) -> ProgramData {
    let io = inputs.into_iter()
        .map(|v| {
            let result = data.exec(v.clone());
            (v.iter().map(i64::to_string).collect(), result)
        });

    ProgramData {
        text: data.text(),
        valid_io: io.collect(),
    }
}

pub fn get_all_programs() -> HashMap<String, ProgramData> {
    let mut programs = HashMap::new();

    let mut rng = rand::rngs::StdRng::seed_from_u64(420);

    let dist = Uniform::new(1, 1_000_000);
    let small = Uniform::new(-1_000, 1_000);

    programs.insert(
        String::from("gcd"),
        generate_program_data(
            data::GCD_DATA,
            {
                let mut base = vec![
                    vec![12, 18],
                    vec![17, 5],
                    vec![5, 5],
                    vec![1_000_000, 10],
                ];

                base.extend(std::iter::repeat_with(|| vec![dist.sample(&mut rng), dist.sample(&mut rng)]).take(10));

                base
            }
        ),
    );

    programs.insert(
        String::from("lcm"),
        generate_program_data(
            data::LCM_DATA,
            {
                let mut base = vec![
                    vec![4, 6],
                    vec![7, 1],
                ];

                base.extend(std::iter::repeat_with(|| vec![dist.sample(&mut rng), dist.sample(&mut rng)]).take(10));

                base
            }
        ),
    );

    programs.insert(
        String::from("factorial"),
        generate_program_data(
            data::FACTORIAL_DATA,
            (1..=20).map(|i| vec![i]).collect()
        ),
    );

    programs.insert(
        String::from("fib"),
        generate_program_data(
            data::FIB_DATA,
            (0..=40).step_by(5).map(|i| vec![i]).collect()
        ),
    );

    programs.insert(
        String::from("bitstring"),
        generate_program_data(
            data::BITSTRING_DATA,
            {
                let mut base = vec![
                    vec![0],
                    vec![-3],
                    vec![10],
                    vec![1345601],
                ];

                base.extend(std::iter::repeat_with(|| vec![dist.sample(&mut rng)]).take(10));

                base
            }
        ),
    );

    programs.insert(
        String::from("numbers"),
        generate_program_data(
            data::NUMBERS_DATA,
            (-20..=20).map(|i| vec![i]).collect()
        ),
    );

    programs.insert(
        String::from("prime_decomposition"),
        generate_program_data(
            data::PRIME_DECOMPOSITION_DATA,
            {
                let mut base = vec![
                    vec![2],
                    vec![3],
                    vec![4],
                    vec![10],
                    vec![25],
                    vec![27],
                    vec![64],
                    vec![999_983],
                ];

                base.extend(std::iter::repeat_with(|| vec![dist.sample(&mut rng)]).take(10));

                base
            }
        ),
    );

    programs.insert(
        String::from("div_mod"),
        generate_program_data(
            data::DIV_MOD_DATA,
            {
                let mut base = vec![
                    vec![1, 0],
                    vec![7, 2],
                    vec![-7, 2],
                    vec![7, -2],
                    vec![-7, -2],
                ];

                base.extend(std::iter::repeat_with(|| vec![small.sample(&mut rng), small.sample(&mut rng)]).take(10));

                base
            }
        ),
    );

    programs.insert(
        String::from("collatz"),
        generate_program_data(
            data::COLLATZ_DATA,
            {
                let mut base = vec![
                    vec![1],
                    vec![27],
                ];

                base.extend(std::iter::repeat_with(|| vec![dist.sample(&mut rng)]).take(10));

                base
            }
        ),
    );

    programs.insert(
        String::from("average"),
        generate_program_data(
            data::AVERAGE_DATA,
            {
                let mut base = vec![
                    vec![1, 5],
                    vec![2, 1, 2],
                    vec![3, -4, 0, 4],
                ];

                base.extend(std::iter::repeat_with(|| {
                    let count = rng.gen_range(1, 8);
                    let mut input = vec![count];
                    input.extend(std::iter::repeat_with(|| small.sample(&mut rng)).take(count as usize));
                    input
                }).take(5));

                base
            }
        ),
    );

    programs.insert(
        String::from("sin_table"),
        generate_program_data(
            data::SIN_TABLE_DATA,
            vec![
                vec![],
            ]
        ),
    );

    programs.insert(
        String::from("triangle"),
        generate_program_data(
            data::TRIANGLE_DATA,
            (0..=5).map(|i| vec![i]).collect()
        ),
    );

    programs
}
