use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpSocket};

use super::constants::LOCAL_HOST;

pub async fn make_listener(listen_addr: SocketAddr, backlog: u32) -> Result<TcpListener, tokio::io::Error> {
  let listener;

  if listen_addr.ip() == LOCAL_HOST {
    listener = TcpListener::bind(listen_addr).await?;
  } else {
    let socket = TcpSocket::new_v4()?;

    socket.set_reuseaddr(true)?;
    socket.bind(listen_addr)?;

    listener = socket.listen(backlog)?;
  }

  Ok(listener)
}
