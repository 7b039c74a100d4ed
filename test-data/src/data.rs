use num_integer::Integer;

pub struct Data {
    text: &'static str,
    exec_fn: fn(Vec<i64>) -> String,
}

impl Data {
    pub fn text(&self) -> &'static str {
        self.text
    }

    pub fn exec(&self, mut input: Vec<i64>) -> String {
        input.reverse();
        (self.exec_fn)(input)
    }
}

const GCD_TEXT: &str = r#"
program gcd;
var a, b, t: int;
begin
    Read(a);
    Read(b);
    while (b <> 0) do
    begin
        t := a mod b;
        a := b;
        b := t
    end;
    WriteLn(a)
end.
"#;

pub const GCD_DATA: Data = Data {
    text: GCD_TEXT,
    exec_fn: |mut input| {
        let a = input.pop().expect("invalid input");
        let b = input.pop().expect("invalid input");

        assert!(input.is_empty());
        format!("{}\n", a.gcd(&b))
    },
};

const LCM_TEXT: &str = r#"
program lcm;
var a, b, x, y, t: int;
begin
    ReadLn(a);
    ReadLn(b);
    x := a;
    y := b;
    while y do
    begin
        t := x mod y;
        x := y;
        y := t
    end;
    Write(a div x * b)
end.
"#;

pub const LCM_DATA: Data = Data {
    text: LCM_TEXT,
    exec_fn: |mut input| {
        let a = input.pop().expect("invalid input");
        let b = input.pop().expect("invalid input");

        assert!(input.is_empty());
        a.lcm(&b).to_string()
    },
};

const FACTORIAL_TEXT: &str = r#"
program factorial;
var n, result: int;
begin
    Read(n);
    result := 1;
    while n > 1 do
    begin
        result := result * n;
        n := n - 1
    end;
    Write(result)
end.
"#;

pub const FACTORIAL_DATA: Data = Data {
    text: FACTORIAL_TEXT,
    exec_fn: |mut input| {
        let n = input.pop().expect("invalid input");

        assert!(input.is_empty());
        (1..=n).product::<i64>().to_string()
    },
};

const FIB_TEXT: &str = r#"
program fib;
var n, a, b, t, i: int;
begin
    Read(n);
    a := 0;
    b := 1;
    i := 0;
    while (i < n) do
    begin
        Write(a, ' ');
        t := a + b;
        a := b;
        b := t;
        i := i + 1
    end
end.
"#;

pub const FIB_DATA: Data = Data {
    text: FIB_TEXT,
    exec_fn: |mut input| {
        let mut output = String::new();

        let n = input.pop().expect("invalid input");
        let (mut a, mut b) = (0i64, 1i64);
        for _ in 0..n {
            output.push_str(&format!("{} ", a));
            let t = a + b;
            a = b;
            b = t;
        }

        assert!(input.is_empty());
        output
    },
};

const BITSTRING_TEXT: &str = r#"
program bitstring;
var a: int;
begin
    Read(a);
    if a < 0 then
        WriteLn('negative')
    else
    begin
        if a = 0 then Write(0);
        while a > 0 do
        begin
            Write(a mod 2);
            a := a div 2
        end
    end
end.
"#;

pub const BITSTRING_DATA: Data = Data {
    text: BITSTRING_TEXT,
    exec_fn: |mut input| {
        let mut output = String::new();

        let mut a = input.pop().expect("invalid input");
        if a < 0 {
            output.push_str("negative\n");
        } else if a == 0 {
            output.push('0');
        }
        while a > 0 {
            output.push_str(&(a & 1).to_string());
            a /= 2;
        }

        assert!(input.is_empty());
        output
    },
};

const NUMBERS_TEXT: &str = r#"
program numbers;
var x: int;
begin
    Read(x);
    if x < 0 then Write('negative')
    else if x = 0 then Write('zero')
    else Write('positive');
    if (x mod 2 = 0) then WriteLn(' even') else WriteLn(' odd')
end.
"#;

pub const NUMBERS_DATA: Data = Data {
    text: NUMBERS_TEXT,
    exec_fn: |mut input| {
        let x = input.pop().expect("invalid input");

        let sign = if x < 0 {
            "negative"
        } else if x == 0 {
            "zero"
        } else {
            "positive"
        };
        let parity = if x.is_even() { "even" } else { "odd" };

        assert!(input.is_empty());
        format!("{} {}\n", sign, parity)
    },
};

const PRIME_DECOMPOSITION_TEXT: &str = r#"
program decompose;
{ trial division, one line per prime factor }
var n, p, k: int;
begin
    Read(n);
    p := 2;
    while (p * p <= n) do
    begin
        k := 0;
        while (n mod p = 0) do
        begin
            n := n div p;
            k := k + 1
        end;
        if (k > 0) then WriteLn(p, '^', k);
        p := p + 1
    end;
    if (n > 1) then WriteLn(n, '^', 1)
end.
"#;

pub const PRIME_DECOMPOSITION_DATA: Data = Data {
    text: PRIME_DECOMPOSITION_TEXT,
    exec_fn: |mut input| {
        let mut output = String::new();

        let mut n = input.pop().expect("invalid input");
        let mut p = 2;
        while p * p <= n {
            let mut k = 0;
            while n.is_multiple_of(&p) {
                n /= p;
                k += 1;
            }
            if k > 0 {
                output.push_str(&format!("{}^{}\n", p, k));
            }
            p += 1;
        }
        if n > 1 {
            output.push_str(&format!("{}^1\n", n));
        }

        assert!(input.is_empty());
        output
    },
};

const DIV_MOD_TEXT: &str = r#"
program divmod;
var a, b: int;
begin
    Read(a);
    Read(b);
    if (b = 0) then
        Write('undefined')
    else
        Write(a div b, ' ', a mod b)
end.
"#;

pub const DIV_MOD_DATA: Data = Data {
    text: DIV_MOD_TEXT,
    exec_fn: |mut input| {
        let a = input.pop().expect("invalid input");
        let b = input.pop().expect("invalid input");

        assert!(input.is_empty());
        if b == 0 {
            "undefined".to_owned()
        } else {
            let (quotient, remainder) = a.div_rem(&b);
            format!("{} {}", quotient, remainder)
        }
    },
};

const COLLATZ_TEXT: &str = r#"
program collatz;
var n, steps: int;
begin
    Read(n);
    steps := 0;
    while (n <> 1) do
    begin
        if (n mod 2 = 0) then n := n div 2 else n := 3 * n + 1;
        steps := steps + 1
    end;
    Write(steps)
end.
"#;

pub const COLLATZ_DATA: Data = Data {
    text: COLLATZ_TEXT,
    exec_fn: |mut input| {
        let mut n = input.pop().expect("invalid input");
        let mut steps = 0;
        while n != 1 {
            n = if n.is_even() { n / 2 } else { 3 * n + 1 };
            steps += 1;
        }

        assert!(input.is_empty());
        steps.to_string()
    },
};

const AVERAGE_TEXT: &str = r#"
program average;
var count, i, x: int;
    sum: double;
begin
    Read(count);
    i := 0;
    while (i < count) do
    begin
        Read(x);
        sum := sum + x;
        i := i + 1
    end;
    Write(sum / count)
end.
"#;

pub const AVERAGE_DATA: Data = Data {
    text: AVERAGE_TEXT,
    exec_fn: |mut input| {
        let count = input.pop().expect("invalid input");
        let mut sum = 0.0;
        for _ in 0..count {
            sum += input.pop().expect("invalid input") as f64;
        }

        assert!(input.is_empty());
        (sum / count as f64).to_string()
    },
};

const SIN_TABLE_TEXT: &str = r#"
program sines;
const STEPS: int = 5;
var i: int;
begin
    i := 0;
    while (i < STEPS) do
    begin
        WriteLn(sin(i));
        i := i + 1
    end
end.
"#;

pub const SIN_TABLE_DATA: Data = Data {
    text: SIN_TABLE_TEXT,
    exec_fn: |input| {
        assert!(input.is_empty());
        (0..5).map(|i| format!("{}\n", (i as f64).sin())).collect()
    },
};

const TRIANGLE_TEXT: &str = r#"
program triangle;
const STAR: string = '*';
var n, i: int;
    line: string;
begin
    Read(n);
    i := 1;
    while (i <= n) do
    begin
        line := STAR * i;
        WriteLn(line);
        i := i + 1
    end
end.
"#;

pub const TRIANGLE_DATA: Data = Data {
    text: TRIANGLE_TEXT,
    exec_fn: |mut input| {
        let n = input.pop().expect("invalid input");

        assert!(input.is_empty());
        (1..=n).map(|i| format!("{}\n", "*".repeat(i as usize))).collect()
    },
};
