//! Connection supervisor tests
//!
//! End-to-end cycles against scripted discovery/advertisement fakes: client and
//! server duplex exchange, resilience to failed lookups, and interrupt handling.


use rfchat_core::{
    ChatConfig, ChatError, ChatResult, ClientEndpoint, ConnectionSupervisor, DiscoverableCommand,
    Endpoint, ServerEndpoint, SupervisorState, SupervisorStats,
};
use tokio::io::{duplex, AsyncRead, AsyncWrite, AsyncWriteExt, DuplexStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use test_utils::*;

// ----------------------------------------------------------------------------
// Harness
// ----------------------------------------------------------------------------

struct RunningSupervisor {
    stdin: DuplexStream,
    stdout: DuplexStream,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<ChatResult<SupervisorStats>>,
}

impl RunningSupervisor {
    fn start<E>(endpoint: E, config: ChatConfig) -> Self
    where
        E: Endpoint + 'static,
    {
        let (stdin, stdin_reader) = duplex(1024);
        let (stdout_writer, stdout) = duplex(4096);
        let (shutdown, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run(endpoint, config, stdin_reader, stdout_writer, shutdown_rx));

        Self {
            stdin,
            stdout,
            shutdown,
            task,
        }
    }

    async fn stop(self) -> ChatResult<SupervisorStats> {
        let _ = self.shutdown.send(());
        tokio::time::timeout(WAIT, self.task)
            .await
            .expect("supervisor did not stop")
            .expect("supervisor task panicked")
    }
}

async fn run<E, I, O>(
    endpoint: E,
    config: ChatConfig,
    input: I,
    output: O,
    shutdown: oneshot::Receiver<()>,
) -> ChatResult<SupervisorStats>
where
    E: Endpoint,
    I: AsyncRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut supervisor = ConnectionSupervisor::new(endpoint, config, input, output);
    supervisor
        .run_until(async {
            let _ = shutdown.await;
        })
        .await
}

// ----------------------------------------------------------------------------
// Client Role
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_client_single_match_exchange_and_rediscovery() {
    let discovery = FakeDiscovery::new();
    let (link, mut remote) = duplex(1024);
    discovery.push_link(link);
    discovery.push_result(Ok(vec![create_test_match()]));

    let endpoint = ClientEndpoint::new(discovery.clone(), create_test_client_descriptor());
    let mut running = RunningSupervisor::start(endpoint, create_test_config());

    let markers = read_until(&mut running.stdout, b"[CONNECTED]\n").await;
    assert_eq!(markers, b"[DISCONNECTED]\n[CONNECTED]\n");

    running.stdin.write_all(b"hello remote\n").await.unwrap();
    let outbound = read_until(&mut remote, b"\n").await;
    assert_eq!(outbound, b"hello remote\n");

    remote.write_all(b"hello local").await.unwrap();
    let inbound = read_until(&mut running.stdout, b"hello local").await;
    assert_eq!(inbound, b"hello local");

    drop(remote);
    let tail = read_until(&mut running.stdout, b"[DISCONNECTED]\n").await;
    assert_eq!(tail, b"[DISCONNECTED]\n");

    wait_until(|| discovery.find_calls() == 2).await;

    let stats = running.stop().await.unwrap();
    assert_eq!(stats.runs, 1);
    assert_eq!(stats.sessions, 1);
    assert_eq!(discovery.connect_calls(), 1);
}

#[tokio::test]
async fn test_failed_lookups_never_stop_the_supervisor() {
    let discovery = FakeDiscovery::new();
    let (link, _remote) = duplex(1024);
    discovery.push_result(Err(ChatError::Discovery("adapter vanished".into())));
    discovery.push_result(Ok(vec![]));
    discovery.push_result(Ok(vec![create_test_match(), create_test_match()]));
    discovery.push_result(Ok(vec![create_test_match()]));
    discovery.push_link(link);

    let endpoint = ClientEndpoint::new(discovery.clone(), create_test_client_descriptor());
    let mut running = RunningSupervisor::start(endpoint, create_test_config());

    // The error restarts the run; empty and ambiguous lookups retry in place
    let markers = read_until(&mut running.stdout, b"[CONNECTED]\n").await;
    assert_eq!(markers, b"[DISCONNECTED]\n[DISCONNECTED]\n[CONNECTED]\n");
    assert_eq!(discovery.find_calls(), 4);

    let stats = running.stop().await.unwrap();
    assert_eq!(stats.runs, 2);
    assert_eq!(stats.retries, 2);
}

#[tokio::test]
async fn test_collaborator_rejecting_descriptor_restarts_run() {
    let discovery = FakeDiscovery::new();
    let (link, _remote) = duplex(1024);
    discovery.push_result(Err(ChatError::InvalidDescriptor("stack rejected".into())));
    discovery.push_result(Err(ChatError::Config("adapter settings".into())));
    discovery.push_result(Ok(vec![create_test_match()]));
    discovery.push_link(link);

    let endpoint = ClientEndpoint::new(discovery.clone(), create_test_client_descriptor());
    let mut running = RunningSupervisor::start(endpoint, create_test_config());

    let markers = read_until(&mut running.stdout, b"[CONNECTED]\n").await;
    assert_eq!(
        markers,
        b"[DISCONNECTED]\n[DISCONNECTED]\n[DISCONNECTED]\n[CONNECTED]\n"
    );

    let stats = running.stop().await.unwrap();
    assert_eq!(stats.runs, 3);
}

#[tokio::test]
async fn test_connect_failure_restarts_run() {
    let discovery = FakeDiscovery::new();
    let (link, _remote) = duplex(1024);
    discovery.push_result(Ok(vec![create_test_match()]));
    discovery.push_connect_error(ChatError::Connect("host is down".into()));
    discovery.push_result(Ok(vec![create_test_match()]));
    discovery.push_link(link);

    let endpoint = ClientEndpoint::new(discovery.clone(), create_test_client_descriptor());
    let mut running = RunningSupervisor::start(endpoint, create_test_config());

    let markers = read_until(&mut running.stdout, b"[CONNECTED]\n").await;
    assert_eq!(markers, b"[DISCONNECTED]\n[DISCONNECTED]\n[CONNECTED]\n");
    assert_eq!(discovery.connect_calls(), 2);

    let stats = running.stop().await.unwrap();
    assert_eq!(stats.runs, 2);
    assert_eq!(stats.retries, 0);
}

// ----------------------------------------------------------------------------
// Server Role
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_server_accepts_again_after_send_failure() {
    let advertiser = FakeAdvertiser::new();
    let discoverable = Some(DiscoverableCommand::new(
        "rfchat-definitely-missing-binary",
        ["discoverable", "on"],
    ));
    let endpoint = ServerEndpoint::new(
        advertiser.clone(),
        create_test_server_descriptor(),
        discoverable,
    );
    let mut running = RunningSupervisor::start(endpoint, create_test_config());

    // A failing discoverability command does not prevent advertising
    wait_until(|| advertiser.accept_calls() == 1).await;
    assert_eq!(advertiser.advertise_calls(), 1);

    advertiser.connect_peer(BrokenWriteLink);
    let markers = read_until(&mut running.stdout, b"[CONNECTED]\n").await;
    assert_eq!(markers, b"[DISCONNECTED]\n[CONNECTED]\n");

    running.stdin.write_all(b"ping\n").await.unwrap();
    let tail = read_until(&mut running.stdout, b"[DISCONNECTED]\n").await;
    assert_eq!(tail, b"[DISCONNECTED]\n");

    wait_until(|| advertiser.accept_calls() == 2).await;

    let stats = running.stop().await.unwrap();
    assert_eq!(stats.sessions, 1);
}

#[tokio::test]
async fn test_server_duplex_exchange() {
    let advertiser = FakeAdvertiser::new();
    let endpoint = ServerEndpoint::new(advertiser.clone(), create_test_server_descriptor(), None);
    let mut running = RunningSupervisor::start(endpoint, create_test_config());

    let (link, mut remote) = duplex(1024);
    advertiser.connect_peer(link);
    read_until(&mut running.stdout, b"[CONNECTED]\n").await;

    remote.write_all(b"from client").await.unwrap();
    read_until(&mut running.stdout, b"from client").await;

    running.stdin.write_all(b"from server\n").await.unwrap();
    assert_eq!(read_until(&mut remote, b"\n").await, b"from server\n");

    running.stop().await.unwrap();
}

// ----------------------------------------------------------------------------
// Interrupts and Fatal Errors
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_interrupt_during_discovery() {
    let discovery = FakeDiscovery::new();
    let endpoint = ClientEndpoint::new(discovery.clone(), create_test_client_descriptor());
    let running = RunningSupervisor::start(endpoint, create_test_config());

    wait_until(|| discovery.find_calls() == 1).await;
    let stats = running.stop().await.unwrap();

    assert_eq!(stats.runs, 1);
    assert_eq!(stats.sessions, 0);
    assert_eq!(discovery.find_calls(), 1);
}

#[tokio::test]
async fn test_interrupt_during_session() {
    let discovery = FakeDiscovery::new();
    let (link, _remote) = duplex(1024);
    discovery.push_link(link);
    discovery.push_result(Ok(vec![create_test_match()]));

    let endpoint = ClientEndpoint::new(discovery.clone(), create_test_client_descriptor());
    let mut running = RunningSupervisor::start(endpoint, create_test_config());
    read_until(&mut running.stdout, b"[CONNECTED]\n").await;

    let stats = running.stop().await.unwrap();
    assert_eq!(stats.sessions, 0);
    assert_eq!(discovery.find_calls(), 1);
}

#[tokio::test]
async fn test_process_fatal_error_stops_supervisor() {
    let discovery = FakeDiscovery::new();
    discovery.push_result(Err(ChatError::Interrupted));

    let endpoint = ClientEndpoint::new(discovery.clone(), create_test_client_descriptor());
    let running = RunningSupervisor::start(endpoint, create_test_config());

    let result = tokio::time::timeout(WAIT, running.task)
        .await
        .expect("supervisor did not stop")
        .expect("supervisor task panicked");
    assert!(matches!(result, Err(ChatError::Interrupted)));
}

#[tokio::test]
async fn test_shutdown_before_first_run() {
    let endpoint = ClientEndpoint::new(FakeDiscovery::new(), create_test_client_descriptor());
    let (_stdin, stdin_reader) = duplex(64);
    let mut output = Vec::new();
    let mut supervisor =
        ConnectionSupervisor::new(endpoint, create_test_config(), stdin_reader, &mut output);
    assert_eq!(supervisor.state(), SupervisorState::Idle);

    let stats = supervisor.run_until(async {}).await.unwrap();

    assert_eq!(supervisor.state(), SupervisorState::Terminating);
    assert_eq!(stats.runs, 0);
    drop(supervisor);
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_state_after_interrupted_session() {
    let discovery = FakeDiscovery::new();
    let (link, _remote) = duplex(1024);
    discovery.push_link(link);
    discovery.push_result(Ok(vec![create_test_match()]));

    let endpoint = ClientEndpoint::new(discovery, create_test_client_descriptor());
    let (_stdin, stdin_reader) = duplex(64);
    let (stdout_writer, mut stdout) = duplex(1024);
    let mut supervisor =
        ConnectionSupervisor::new(endpoint, create_test_config(), stdin_reader, stdout_writer);

    let (connected_tx, connected_rx) = oneshot::channel();
    let watcher = async move {
        read_until(&mut stdout, b"[CONNECTED]\n").await;
        let _ = connected_tx.send(());
        stdout
    };
    let (result, _stdout) = tokio::join!(
        supervisor.run_until(async {
            let _ = connected_rx.await;
        }),
        watcher
    );

    assert_eq!(result.unwrap().sessions, 0);
    assert_eq!(supervisor.state(), SupervisorState::Terminating);
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let endpoint = ClientEndpoint::new(FakeDiscovery::new(), create_test_client_descriptor());
    let config = create_test_config().with_poll_timeout(std::time::Duration::ZERO);
    let running = RunningSupervisor::start(endpoint, config);

    let result = running.stop().await;
    assert!(matches!(result, Err(ChatError::Config(_))));
}
