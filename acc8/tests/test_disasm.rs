use acc8::prelude::*;
use acc8_compiler::compile_source;

#[test]
fn test_disassemble_compiled_loop() {
    let reports = compile_source("{ int x while true { print(x) } }$");
    let image = reports[0].image().unwrap();

    let mut buf = String::new();
    Disassembler::new(image.as_bytes()).disassemble(&mut buf).unwrap();

    let lines: Vec<_> = buf.lines().collect();
    assert_eq!(
        lines,
        vec![
            "00: A9 00     LDA #$00",
            "02: 8D 13 00  STA $13",
            "05: AC 13 00  LDY $13",
            "08: A2 01     LDX #$01",
            "0A: FF        SYS",
            "0B: A2 00     LDX #$00",
            "0D: EC FB 00  CPX $FB",
            "10: D0 F3     BNE $F3 ; -> 05",
            "12: 00        BRK",
        ]
    );
}
