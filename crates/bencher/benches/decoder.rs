use std::hint::black_box;

use bencher::{Feeding, Fixture};
use bytes::BytesMut;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use micro_http_parser::codec::MessageDecoder;
use micro_http_parser::parser::Parser;
use tokio_util::codec::Decoder;

static GET_SMALL: Fixture = Fixture::request("get_small", include_str!("../resources/request/get_small.txt"));
static GET_LARGE: Fixture = Fixture::request("get_large", include_str!("../resources/request/get_large.txt"));
static POST_CHUNKED: Fixture = Fixture::request("post_chunked", include_str!("../resources/request/post_chunked.txt"));
static HELLO: Fixture = Fixture::response("hello", include_str!("../resources/response/hello.txt"));

fn fixtures() -> Vec<Fixture> {
    vec![GET_SMALL, GET_LARGE, POST_CHUNKED, HELLO]
}

fn benchmark_parser_feed(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("parser_feed");

    for fixture in fixtures() {
        let wire = fixture.wire();
        group.throughput(Throughput::Bytes(wire.len() as u64));

        for feeding in [Feeding::Whole, Feeding::Pieces(16), Feeding::Pieces(1)] {
            let pieces = feeding.split(&wire);
            let id = BenchmarkId::new(fixture.name(), feeding.label());
            group.bench_with_input(id, &pieces, |b, pieces| {
                let mut parser = Parser::new(fixture.mode());
                b.iter(|| {
                    for piece in pieces {
                        parser.feed(black_box(piece)).expect("fixture should be a valid http message");
                    }
                    black_box(parser.next_message().expect("fixture should be a complete http message"));
                });
            });
        }
    }

    group.finish();
}

fn benchmark_message_decoder(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("message_decoder");

    for fixture in fixtures() {
        let wire = fixture.wire();
        group.throughput(Throughput::Bytes(wire.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fixture.name()), &wire, |b, wire| {
            let mut decoder = MessageDecoder::new(fixture.mode());
            b.iter_batched_ref(
                || BytesMut::from(&wire[..]),
                |bytes_mut| {
                    let message = decoder.decode(bytes_mut).expect("fixture should be a valid http message").unwrap();
                    black_box(message);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(decoder, benchmark_parser_feed, benchmark_message_decoder);
criterion_main!(decoder);
