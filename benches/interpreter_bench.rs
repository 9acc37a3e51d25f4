use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use monkey::{Environment, evaluate, parse, tokenize};

// A reasonably complex program for benchmarking
const BENCH_INPUT: &str = r#"
let fibonacci = fn(n) {
  if (n < 2) {
    n
  } else {
    fibonacci(n - 1) + fibonacci(n - 2)
  }
};

let map = fn(arr, f) {
  let iter = fn(arr, accumulated) {
    if (len(arr) == 0) {
      accumulated
    } else {
      iter(rest(arr), push(accumulated, f(first(arr))));
    }
  };
  iter(arr, []);
};

let people = [{"name": "Alice", "age": 24}, {"name": "Anna", "age": 28}];
let getName = fn(person) { person["name"]; };
map(people, getName);

let average = fn(a, b) { (a + b) / 2 };
average(10, 15);
fibonacci(15);
"#;

fn bench_interpreter(c: &mut Criterion) {
    let mut group = c.benchmark_group("Interpreter Stages");

    group.bench_with_input(
        BenchmarkId::new("tokenize", "fibonacci_program"),
        &BENCH_INPUT,
        |b, input| b.iter(|| tokenize(black_box(input))),
    );

    group.bench_with_input(
        BenchmarkId::new("parse", "fibonacci_program"),
        &BENCH_INPUT,
        |b, input| b.iter(|| parse(black_box(input))),
    );

    // Parsing stays outside the measured closure
    let (program, errors) = parse(BENCH_INPUT);
    assert!(errors.is_empty(), "benchmark program must parse: {:?}", errors);
    group.bench_with_input(
        BenchmarkId::new("evaluate", "fibonacci_program"),
        &program,
        |b, program| {
            b.iter(|| {
                let env = Environment::new();
                evaluate(black_box(program), &env)
            })
        },
    );

    group.finish();
}

criterion_group!(benches, bench_interpreter);
criterion_main!(benches);
