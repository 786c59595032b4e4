use ircflow::{ConfigBuilder, Line, LineTransmitter, SendLoop};

use tracing_subscriber::EnvFilter;

use std::{
    io::{BufRead, BufReader},
    net::{TcpListener, TcpStream},
    thread,
    time::Duration,
};

#[test]
fn lines_reach_the_peer_in_priority_order_with_crlf_framing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let accept = thread::spawn(move || listener.accept().unwrap().0);
    let stream = TcpStream::connect(addr).unwrap();
    let peer = accept.join().unwrap();
    peer.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

    let config = ConfigBuilder::default()
        .channel("integration")
        .rate_limit(Duration::from_millis(20))
        .tick_interval(Duration::from_millis(5))
        .build()
        .unwrap();
    let (send_loop, outbox) = SendLoop::new(LineTransmitter::new(stream), config);
    let shutdown = send_loop.shutdown_handle();

    outbox.send_chat("hello from the wire");
    outbox.ping();
    outbox.send(Line::new("JOIN #integration"));
    let handle = send_loop.spawn();

    let mut reader = BufReader::new(peer);
    let mut read_line = move || {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        line
    };
    assert_eq!(read_line(), "PING :tmi.twitch.tv\r\n");
    assert_eq!(read_line(), "PRIVMSG #integration :hello from the wire\r\n");
    assert_eq!(read_line(), "JOIN #integration\r\n");

    shutdown.cancel();
    handle.join().unwrap().unwrap();
}
