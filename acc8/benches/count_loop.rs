use criterion::{black_box, criterion_group, criterion_main, Criterion};

use acc8::prelude::*;
use acc8_compiler::compile_source;

const COUNT_LOOP: &str = r#"{
    int a
    while (a != 9) {
        print(a)
        a = 1 + a
    }
}$"#;

fn criterion_benchmark(c: &mut Criterion) {
    {
        let reports = compile_source(COUNT_LOOP);
        let image = reports[0].image().expect("count loop must compile");

        let mut vm = Acc8Vm::new(Acc8Conf::default());
        vm.load_image(image.as_bytes()).unwrap();

        c.bench_function("count loop image", |b| b.iter(|| black_box(vm.execute())));
    }

    c.bench_function("compile count loop", |b| {
        b.iter(|| black_box(compile_source(black_box(COUNT_LOOP))))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
