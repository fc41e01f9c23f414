pub mod cart;
pub mod domain;
pub mod ports;
pub mod progress;
pub mod session;
pub mod storage;

pub use cart::{CartError, CartLedger, CartLine, Order, PaymentDetails, PaymentMethod, Product};
pub use domain::{
    Application, Course, Enrollment, NewApplication, NewCourse, NewQuestionPaper, NewUser,
    PaperFilter, PaperType, QuestionPaper, Role, User, UserCredentials,
};
pub use ports::{DatabaseService, PortError, PortResult};
pub use progress::{CourseSummary, ProgressError, ProgressTracker};
pub use session::{AuthApi, ClientError, Destination, SessionClient, SessionState};
pub use storage::{DurableStorage, MemoryStorage, StorageError};
