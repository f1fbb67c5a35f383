use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rustyhl7::{path, Message};

const SAMPLE: &str = "MSH|^~\\&|SENDING|FACILITY|RECEIVING|DESTFAC|20240101120000||ADT^A01|MSG00001|P|2.3\rEVN|A01|20240101120000\rPID|1||12345^^^HOSP^MR~67890^^^CLINIC^PI||DOE^JOHN^Q||19700101|M|||123 MAIN ST^^METROPOLIS^IL^44130\rNK1|1|DOE^JANE|SPO\rOBX|1|TX|NOTE||stable and improving";

fn parse_benchmark(c: &mut Criterion) {
    c.bench_function("parse", |b| {
        b.iter(|| Message::parse(black_box(SAMPLE)).unwrap())
    });

    c.bench_function("query_pid_3_1", |b| {
        let message = Message::parse(SAMPLE).unwrap();
        b.iter(|| path::query(&message, black_box("PID.3.1")).unwrap())
    });

    c.bench_function("sparse_write", |b| {
        b.iter(|| {
            let message = Message::parse(SAMPLE).unwrap();
            let field = message.segment(6).unwrap().child(5).unwrap();
            field.set_value(black_box("x"));
            message.to_string()
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50);
    targets = parse_benchmark
}

criterion_main!(benches);
