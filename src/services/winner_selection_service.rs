use crate::entities::{
    PrizeType, job_listing_entity as jobs, monthly_draw_entity as draws,
    registration_entity as registrations, winner_entity as winners,
};
use crate::error::{AppError, AppResult};
use crate::models::{SelectionSummary, WinnerLine};
use crate::services::{DrawService, EligibilityService, NotificationService, WinnerNotice};
use crate::utils::{first_of_month, format_month, month_label};
use chrono::{NaiveDate, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tokio::task::JoinHandle;

pub const DEFAULT_JOB_WINNERS: usize = 10;
pub const DEFAULT_INCOME_WINNERS: usize = 5;

pub const BASIC_INCOME_PRIZE_NAME: &str = "Basic Income";
pub const BASIC_INCOME_PRIZE_DETAILS: &str =
    "1 Year Basic Income Support - GHS 500 per month for 12 months";

/// 职位描述快照最多保留的字符数
const JOB_DESCRIPTION_LIMIT: usize = 200;

#[derive(Debug, Clone)]
pub struct SelectionRequest {
    pub month: NaiveDate,
    pub job_winners: usize,
    pub income_winners: usize,
    pub dry_run: bool,
}

impl SelectionRequest {
    pub fn new(month: NaiveDate) -> Self {
        Self {
            month,
            job_winners: DEFAULT_JOB_WINNERS,
            income_winners: DEFAULT_INCOME_WINNERS,
            dry_run: false,
        }
    }
}

/// 抽取结果：职位中奖者与其职位，收入中奖者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPlan<E, J> {
    pub job_awards: Vec<(E, J)>,
    pub income_awards: Vec<E>,
}

pub struct SelectionOutcome {
    pub summary: SelectionSummary,
    /// dry run 时为 None
    pub notifications: Option<JoinHandle<usize>>,
}

/// (职位中奖数, 收入中奖数)
///
/// 职位数受请求数、在招职位数、有资格人数三者约束；收入名额从剩余人数里取。
pub fn winner_counts(
    job_requested: usize,
    income_requested: usize,
    active_jobs: usize,
    eligible: usize,
) -> (usize, usize) {
    let job = job_requested.min(active_jobs).min(eligible);
    let income = income_requested.min(eligible - job);
    (job, income)
}

/// 均匀随机、无放回地抽取中奖者
///
/// 职位池打乱后按 `i % len` 分配给第 i 个职位中奖者。
pub fn plan_selection<E, J, R>(
    mut entrants: Vec<E>,
    mut job_pool: Vec<J>,
    job_requested: usize,
    income_requested: usize,
    rng: &mut R,
) -> SelectionPlan<E, J>
where
    J: Clone,
    R: Rng + ?Sized,
{
    let (job_count, income_count) =
        winner_counts(job_requested, income_requested, job_pool.len(), entrants.len());

    entrants.shuffle(rng);
    job_pool.shuffle(rng);

    let mut remaining = entrants.into_iter();
    let job_awards = remaining
        .by_ref()
        .take(job_count)
        .enumerate()
        .map(|(i, entrant)| (entrant, job_pool[i % job_pool.len()].clone()))
        .collect();
    let income_awards = remaining.take(income_count).collect();

    SelectionPlan {
        job_awards,
        income_awards,
    }
}

fn job_prize_details(job: &jobs::Model) -> String {
    let description: String = job.description.chars().take(JOB_DESCRIPTION_LIMIT).collect();
    format!("{} - {}", job.title, description)
}

struct Award {
    registration: registrations::Model,
    prize_type: PrizeType,
    prize_name: String,
    prize_details: String,
}

impl Award {
    fn line(&self) -> WinnerLine {
        WinnerLine {
            registration_id: self.registration.id,
            full_name: self.registration.full_name(),
            email: self.registration.email.clone(),
            prize_type: self.prize_type,
            prize_name: self.prize_name.clone(),
            prize_details: self.prize_details.clone(),
        }
    }

    fn notice(&self) -> WinnerNotice {
        WinnerNotice {
            full_name: self.registration.full_name(),
            email: self.registration.email.clone(),
            prize_type: self.prize_type,
            prize_name: self.prize_name.clone(),
        }
    }
}

/// 每月开奖
///
/// 整个过程在一个事务里完成，抽奖行 `SELECT ... FOR UPDATE`；
/// 写入中奖记录后用带条件的 UPDATE 完成 active -> completed，
/// 抢不到则整体回滚，保证一个月只开一次奖。
#[derive(Clone)]
pub struct WinnerSelectionService {
    pool: DatabaseConnection,
    draw_service: DrawService,
    eligibility: EligibilityService,
    notifications: NotificationService,
}

impl WinnerSelectionService {
    pub fn new(
        pool: DatabaseConnection,
        draw_service: DrawService,
        eligibility: EligibilityService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            pool,
            draw_service,
            eligibility,
            notifications,
        }
    }

    pub async fn select_winners(&self, request: &SelectionRequest) -> AppResult<SelectionOutcome> {
        let month = first_of_month(request.month);
        let label = month_label(month);
        log::info!("Processing draw for {label}");

        let txn = self.pool.begin().await?;

        let draw = draws::Entity::find()
            .filter(draws::Column::DrawMonth.eq(month))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotReady(format!("No draw found for {label}")))?;

        if draw.winners_selected {
            return Err(AppError::AlreadySelected(format!(
                "Winners already selected for {label}"
            )));
        }
        if !draw.is_ready_for_draw() {
            return Err(AppError::NotReady(format!(
                "Draw for {label} is not ready. Status: {}, participants: {}/{}",
                draw.status, draw.current_participants, draw.minimum_participants
            )));
        }

        let entrants = self.eligibility.eligible_entrants(&txn, month).await?;
        let eligible_participants = entrants.len();
        log::info!("Found {eligible_participants} eligible participants for {label}");
        if entrants.is_empty() {
            return Err(AppError::NoEligibleParticipants(format!(
                "No eligible participants for {label}"
            )));
        }

        let job_pool = jobs::Entity::find()
            .filter(jobs::Column::IsActive.eq(true))
            .order_by_asc(jobs::Column::Id)
            .all(&txn)
            .await?;

        let plan = {
            let mut rng = rand::thread_rng();
            plan_selection(
                entrants,
                job_pool,
                request.job_winners,
                request.income_winners,
                &mut rng,
            )
        };

        let job_winners_selected = plan.job_awards.len();
        let income_winners_selected = plan.income_awards.len();
        log::info!(
            "Selecting {job_winners_selected} job winners and {income_winners_selected} income winners"
        );

        let mut awards: Vec<Award> = plan
            .job_awards
            .into_iter()
            .map(|(registration, job)| Award {
                registration,
                prize_type: PrizeType::Job,
                prize_details: job_prize_details(&job),
                prize_name: job.title,
            })
            .collect();
        awards.extend(plan.income_awards.into_iter().map(|registration| Award {
            registration,
            prize_type: PrizeType::BasicIncome,
            prize_name: BASIC_INCOME_PRIZE_NAME.to_string(),
            prize_details: BASIC_INCOME_PRIZE_DETAILS.to_string(),
        }));

        let summary = SelectionSummary {
            month: format_month(month),
            dry_run: request.dry_run,
            eligible_participants,
            job_winners_selected,
            income_winners_selected,
            winners: awards.iter().map(Award::line).collect(),
        };

        if request.dry_run {
            for award in &awards {
                log::info!(
                    "[DRY RUN] Would select {} ({}) for {}",
                    award.registration.full_name(),
                    award.registration.email,
                    award.prize_name
                );
            }
            txn.rollback().await?;
            log::info!("[DRY RUN] No changes made for {label}");
            return Ok(SelectionOutcome {
                summary,
                notifications: None,
            });
        }

        let now = Utc::now();
        for award in &awards {
            winners::ActiveModel {
                registration_id: Set(award.registration.id),
                monthly_draw_id: Set(draw.id),
                prize_type: Set(award.prize_type),
                prize_details: Set(award.prize_details.clone()),
                is_claimed: Set(false),
                created_date: Set(Some(now)),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            log::info!(
                "Winner: {} ({}) - {}",
                award.registration.full_name(),
                award.registration.email,
                award.prize_name
            );
        }

        if !self.draw_service.mark_completed(&txn, draw.id).await? {
            return Err(AppError::AlreadySelected(format!(
                "Winners already selected for {label}"
            )));
        }

        txn.commit().await?;
        log::info!(
            "Draw for {label} completed with {} winners",
            summary.total_winners()
        );

        let notices = awards.iter().map(Award::notice).collect();
        let notifications = self.notifications.dispatch(notices);

        Ok(SelectionOutcome {
            summary,
            notifications: Some(notifications),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_winner_counts_are_clamped() {
        assert_eq!(winner_counts(10, 5, 3, 1000), (3, 5));
        assert_eq!(winner_counts(10, 5, 20, 12), (10, 2));
        assert_eq!(winner_counts(10, 5, 0, 7), (0, 5));
        assert_eq!(winner_counts(10, 5, 20, 4), (4, 0));
        assert_eq!(winner_counts(0, 0, 5, 100), (0, 0));
    }

    #[test]
    fn test_plan_selection_distinct_winners_and_job_reuse() {
        let mut rng = StdRng::seed_from_u64(7);
        let entrants: Vec<i64> = (1..=12).collect();
        let plan = plan_selection(entrants, vec!["a", "b", "c"], 5, 5, &mut rng);

        assert_eq!(plan.job_awards.len(), 3);
        assert_eq!(plan.income_awards.len(), 5);

        let mut seen = HashSet::new();
        for (entrant, _) in &plan.job_awards {
            assert!(seen.insert(*entrant));
        }
        for entrant in &plan.income_awards {
            assert!(seen.insert(*entrant));
        }
        let jobs: HashSet<_> = plan.job_awards.iter().map(|(_, job)| *job).collect();
        assert_eq!(jobs.len(), 3);
    }

    #[test]
    fn test_plan_selection_limits_job_winners_to_open_jobs() {
        let mut rng = StdRng::seed_from_u64(11);
        let entrants: Vec<i64> = (1..=30).collect();
        let plan = plan_selection(entrants, vec!["only"], 10, 5, &mut rng);

        assert_eq!(plan.job_awards.len(), 1);
        assert_eq!(plan.income_awards.len(), 5);
    }

    #[test]
    fn test_plan_selection_no_jobs_gives_income_only() {
        let mut rng = StdRng::seed_from_u64(3);
        let plan = plan_selection((1..=3).collect::<Vec<i64>>(), Vec::<&str>::new(), 10, 5, &mut rng);
        assert!(plan.job_awards.is_empty());
        assert_eq!(plan.income_awards.len(), 3);
    }

    #[test]
    fn test_job_prize_details_truncates_on_char_boundary() {
        let job = jobs::Model {
            id: 1,
            title: "Teller".to_string(),
            description: "é".repeat(250),
            job_type: crate::entities::JobType::FullTime,
            salary_range: "GHS 2000".to_string(),
            requirements: String::new(),
            is_active: true,
            created_date: None,
        };
        let details = job_prize_details(&job);
        assert!(details.starts_with("Teller - "));
        assert_eq!(details.chars().count(), "Teller - ".len() + 200);
    }
}
