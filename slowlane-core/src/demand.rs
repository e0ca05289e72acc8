/// A single job moving through the system: queue, then a server, then gone.
#[derive(Debug, Clone, PartialEq)]
pub struct Demand {
    arrival_time: f64,
    start_service_time: Option<f64>,
    leave_time: Option<f64>,
}

impl Demand {
    /// Creates a demand admitted into the waiting room at `time`.
    pub fn arrive(time: f64) -> Self {
        Self {
            arrival_time: time,
            start_service_time: None,
            leave_time: None,
        }
    }

    #[inline]
    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    #[inline]
    pub fn start_service_time(&self) -> Option<f64> {
        self.start_service_time
    }

    #[inline]
    pub fn leave_time(&self) -> Option<f64> {
        self.leave_time
    }

    pub(crate) fn start_service(&mut self, time: f64) {
        self.start_service_time = Some(time);
    }

    /// Stamps the departure and returns the response time.
    pub(crate) fn depart(&mut self, time: f64) -> f64 {
        self.leave_time = Some(time);
        time - self.arrival_time
    }

    /// Departure time minus arrival time, once departed.
    pub fn response_time(&self) -> Option<f64> {
        self.leave_time.map(|leave| leave - self.arrival_time)
    }

    /// Time spent in the waiting room before a server picked the demand up.
    pub fn waiting_time(&self) -> Option<f64> {
        self.start_service_time
            .map(|start| start - self.arrival_time)
    }
}
