use crate::entities::PrizeType;
use crate::external::EmailSender;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const WINNER_EMAIL_SUBJECT: &str = "Congratulations! You've Won - Jobmarkt";

/// 一封中奖通知的内容
#[derive(Debug, Clone)]
pub struct WinnerNotice {
    pub full_name: String,
    pub email: String,
    pub prize_type: PrizeType,
    pub prize_name: String,
}

/// 中奖通知
///
/// 只在开奖事务提交之后调用；发送失败只记日志，不影响已写入的中奖记录。
#[derive(Clone)]
pub struct NotificationService {
    sender: Arc<dyn EmailSender>,
    dashboard_url: String,
}

impl NotificationService {
    pub fn new(sender: Arc<dyn EmailSender>, dashboard_url: impl Into<String>) -> Self {
        Self {
            sender,
            dashboard_url: dashboard_url.into(),
        }
    }

    pub fn compose_body(&self, notice: &WinnerNotice) -> String {
        let prize_line = match notice.prize_type {
            PrizeType::Job => format!(
                "You have been selected for a job opportunity: {}.\n\
                 Our team will contact you with the next steps for your placement.",
                notice.prize_name
            ),
            PrizeType::BasicIncome => format!(
                "You have been selected for {}: 1 Year Basic Income Support, \
                 GHS 500 per month for 12 months.\n\
                 Payments will be sent to your registered mobile money account.",
                notice.prize_name
            ),
        };

        format!(
            "Dear {},\n\n\
             Congratulations! You are one of this month's Jobmarkt winners.\n\n\
             {}\n\n\
             Check your dashboard for details: {}\n\n\
             The Jobmarkt Team",
            notice.full_name, prize_line, self.dashboard_url
        )
    }

    /// 发送一封中奖通知，返回是否发送成功
    pub async fn notify(&self, notice: &WinnerNotice) -> bool {
        let body = self.compose_body(notice);
        match self
            .sender
            .send_email(&notice.email, WINNER_EMAIL_SUBJECT, &body)
            .await
        {
            Ok(()) => {
                log::info!(
                    "Winner notification sent to {} ({})",
                    notice.email,
                    notice.prize_type
                );
                true
            }
            Err(e) => {
                log::warn!("Failed to send winner notification to {}: {e}", notice.email);
                false
            }
        }
    }

    /// 后台逐个发送，JoinHandle 的结果为成功发送的封数
    pub fn dispatch(&self, notices: Vec<WinnerNotice>) -> JoinHandle<usize> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut sent = 0;
            for notice in &notices {
                if service.notify(notice).await {
                    sent += 1;
                }
            }
            log::info!("Winner notifications sent: {sent}/{}", notices.len());
            sent
        })
    }
}
