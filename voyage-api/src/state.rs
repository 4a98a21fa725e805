use voyage_catalog::{
    BookingService, DestinationService, FavoriteService, RatingAggregator, ReviewService, UserService,
};
use voyage_core::TravelContext;
use voyage_notify::{NotificationService, ReminderScheduler};

/// Services shared by every handler. Built once so the rating
/// aggregator's per-destination locks are shared across requests.
#[derive(Clone)]
pub struct ApiState {
    pub ctx: TravelContext,
    pub destinations: DestinationService,
    pub bookings: BookingService,
    pub reviews: ReviewService,
    pub favorites: FavoriteService,
    pub users: UserService,
    pub notifications: NotificationService,
    pub scheduler: ReminderScheduler,
}

impl ApiState {
    pub fn new(ctx: TravelContext) -> Self {
        let ratings = RatingAggregator::new(ctx.clone());
        Self {
            destinations: DestinationService::new(ctx.clone()),
            bookings: BookingService::new(ctx.clone()),
            reviews: ReviewService::new(ctx.clone(), ratings),
            favorites: FavoriteService::new(ctx.clone()),
            users: UserService::new(ctx.clone()),
            notifications: NotificationService::new(ctx.clone()),
            scheduler: ReminderScheduler::new(ctx.clone()),
            ctx,
        }
    }
}
