use acc8::prelude::*;
use acc8_compiler::compile_source;

/// Compile every program of a batch and run the ones that produced an image.
fn run_all(source: &str, conf: Acc8Conf) -> Vec<Option<Acc8Result<String>>> {
    compile_source(source)
        .iter()
        .map(|report| {
            report.image().map(|image| -> Acc8Result<String> {
                let mut vm = Acc8Vm::new(conf.clone());
                vm.load_image(image.as_bytes())?;
                vm.execute()?;
                Ok(vm.take_output())
            })
        })
        .collect()
}

fn run(source: &str) -> String {
    let mut outputs = run_all(source, Acc8Conf::default());
    assert_eq!(outputs.len(), 1);
    outputs.remove(0).expect("program did not compile").unwrap()
}

#[test]
fn test_batch_fixture() {
    let outputs = run_all(
        include_str!("../../acc8_compiler/tests/programs.acc8"),
        Acc8Conf { max_steps: Some(10_000) },
    );

    assert_eq!(outputs.len(), 5);
    assert_eq!(outputs[0].as_ref().unwrap().as_ref().unwrap(), "012done");
    assert!(outputs[1].is_none());
    assert!(outputs[2].is_none());
    assert!(outputs[3].is_none());
    assert_eq!(outputs[4].as_ref().unwrap().as_ref().unwrap(), "hello worldtrue");
}

#[test]
fn test_defaults() {
    assert_eq!(run("{ int a string s boolean b print(a) print(s) print(b) }$"), "0false");
}

#[test]
fn test_addition() {
    assert_eq!(run("{ int a a = 2 + 3 + 4 print(a) print(1 + a) }$"), "910");
}

#[test]
fn test_comparisons() {
    let source = r#"{
        int a
        a = 4
        print((a == 4))
        print((a != 4))
        print((1 + a == 5))
        boolean b
        b = (a != 2)
        print(b)
        print(("x" == "x"))
        print(("x" == "y"))
    }$"#;
    assert_eq!(run(source), "truefalsetruetruetruefalse");
}

#[test]
fn test_if_statements() {
    let source = r#"{
        int a
        a = 1
        if (a == 1) { print("one") }
        if (a == 2) { print("two") }
        if (a != 2) { print("not two") }
        if true { print("yes") }
        if false { print("no") }
    }$"#;
    assert_eq!(run(source), "onenot twoyes");
}

#[test]
fn test_nested_scopes() {
    let source = r#"{
        int a
        a = 1
        {
            int a
            a = 2
            print(a)
        }
        print(a)
    }$"#;
    assert_eq!(run(source), "21");
}

#[test]
fn test_nested_loops() {
    let source = r#"{
        int i
        while (i != 2) {
            int j
            j = 0
            while (j != 2) {
                print(j)
                j = 1 + j
            }
            i = 1 + i
        }
    }$"#;
    assert_eq!(run(source), "0101");
}

#[test]
fn test_infinite_loop_hits_step_limit() {
    let mut outputs = run_all(
        "{ int x while true { print(x) } }$",
        Acc8Conf { max_steps: Some(1_000) },
    );
    let result = outputs.remove(0).unwrap();
    assert!(matches!(result, Err(Acc8Error::StepLimit(1_000))));
}
