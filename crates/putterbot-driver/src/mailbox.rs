//! 子系统邮箱
//!
//! 控制器 → 子系统任务的消息投递通道（单生产者/单消费者）。
//!
//! 发送端永不阻塞：投递失败只发生在工作线程已退出时，按
//! fire-and-forget 契约记一条 warn 日志后丢弃。接收端在工作线程
//! 内阻塞消费，按投递顺序出队；阻塞序列完成后可以一次性清空
//! 积压，防止陈旧命令重放。

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};
use std::time::Duration;
use tracing::{trace, warn};

/// 创建一对邮箱端点
///
/// `name` 用于日志标识（子系统名）。
pub fn mailbox<T>(name: &'static str) -> (MailboxSender<T>, Mailbox<T>) {
    let (tx, rx) = unbounded();
    (MailboxSender { tx, name }, Mailbox { rx, name })
}

/// 邮箱发送端（控制器持有）
#[derive(Clone)]
pub struct MailboxSender<T> {
    tx: Sender<T>,
    name: &'static str,
}

impl<T> MailboxSender<T> {
    /// 投递一条消息（永不阻塞）
    ///
    /// 工作线程已退出时投递失败，消息被丢弃并记 warn 日志。
    pub fn post(&self, message: T) {
        if self.tx.send(message).is_err() {
            warn!(subsystem = self.name, "Mailbox receiver gone, message dropped");
        }
    }

    /// 当前积压消息数
    pub fn backlog(&self) -> usize {
        self.tx.len()
    }
}

/// 邮箱接收端（子系统任务持有）
pub struct Mailbox<T> {
    rx: Receiver<T>,
    name: &'static str,
}

impl<T> Mailbox<T> {
    /// 带超时的阻塞接收
    ///
    /// 超时用于空闲周期（遥测节拍、运行标志检查），不是错误。
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// 非阻塞接收
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.rx.try_recv()
    }

    /// 清空所有积压消息，返回丢弃数量
    ///
    /// 阻塞序列完成后调用，丢弃序列执行期间积压的陈旧命令。
    pub fn clear(&self) -> usize {
        let mut discarded = 0;
        while self.rx.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            trace!(subsystem = self.name, discarded, "Mailbox backlog cleared");
        }
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_consumed_in_delivery_order() {
        let (tx, rx) = mailbox::<u32>("test");
        tx.post(1);
        tx.post(2);
        tx.post(3);

        assert_eq!(rx.try_recv(), Ok(1));
        assert_eq!(rx.try_recv(), Ok(2));
        assert_eq!(rx.try_recv(), Ok(3));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_clear_discards_backlog() {
        let (tx, rx) = mailbox::<u32>("test");
        for i in 0..5 {
            tx.post(i);
        }
        assert_eq!(tx.backlog(), 5);
        assert_eq!(rx.clear(), 5);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_post_after_receiver_dropped_is_silent() {
        let (tx, rx) = mailbox::<u32>("test");
        drop(rx);
        // fire-and-forget：不 panic、不返回错误
        tx.post(42);
    }

    #[test]
    fn test_recv_timeout_on_empty() {
        let (_tx, rx) = mailbox::<u32>("test");
        let result = rx.recv_timeout(Duration::from_millis(1));
        assert_eq!(result, Err(RecvTimeoutError::Timeout));
    }
}
